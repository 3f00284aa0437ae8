use crate::error::{CliError, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{Layer, Registry, fmt, prelude::*};

/// Environment variable whose filter directives replace the `-v`/`-q` level on
/// the console, e.g. `TIMETABLER_LOG=timetabler::engine=debug`.
pub const LOG_ENV: &str = "TIMETABLER_LOG";

type FileLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Console level for the given flags: warnings by default, one step more
/// detail per `-v`, errors only with `-q`.
pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs the global subscriber: compact console output on stderr and, with
/// `log_file`, a plain-text file that records debug events whatever the
/// console level.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let directives = std::env::var(LOG_ENV).ok();
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(console_filter(level_for(verbosity, quiet), directives.as_deref()));
    let file = log_file.as_deref().map(file_layer).transpose()?;

    tracing_subscriber::registry()
        .with(file)
        .with(console)
        .try_init()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install logger: {}", e)))
}

/// Directives win when they parse; otherwise the flag level applies.
fn console_filter(level: LevelFilter, directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(level.into()))
}

fn file_layer(path: &Path) -> Result<FileLayer> {
    let file = File::create(path)?;
    Ok(fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(LevelFilter::DEBUG)
        .boxed())
}
