mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    info!("Timetabler CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let command_result = match cli.command {
        Commands::Generate(args) => {
            info!("Dispatching to 'generate' command.");
            commands::generate::run(args).await
        }
        Commands::Check(args) => {
            info!("Dispatching to 'check' command.");
            commands::check::run(args).await
        }
        Commands::Verify(args) => {
            info!("Dispatching to 'verify' command.");
            commands::verify::run(args).await
        }
    };

    match &command_result {
        Ok(_) => {
            info!("✅ Command completed successfully.");
            println!("✅ Command completed successfully.");
        }
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
