use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Timetabler Developers",
    version,
    about = "Timetabler CLI - Generates conflict-free weekly school timetables, or explains why none exists.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE).
    /// TIMETABLER_LOG directives override it on the console.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also write DEBUG-level logs to this file, whatever the console level
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a weekly timetable from a snapshot.
    Generate(GenerateArgs),
    /// Run the structural checks on a snapshot without searching.
    Check(CheckArgs),
    /// Check a stored schedule against the snapshot it was generated from.
    Verify(VerifyArgs),
}

/// Engine configuration sources shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Path to an engine configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S search.time-limit-secs=30
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Path to the input snapshot file (TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the generated schedule. Printed to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Override the search time limit, in seconds.
    #[arg(short = 't', long, value_name = "SECS")]
    pub time_limit: Option<u64>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Path to the input snapshot file (TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Arguments for the `verify` subcommand.
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Path to the snapshot the schedule was generated from.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the schedule file to verify.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub schedule: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,
}
