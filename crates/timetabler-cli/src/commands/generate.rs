use super::{load_snapshot, print_report};
use crate::cli::GenerateArgs;
use crate::config::builder::build_config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use std::path::Path;
use timetabler::core::io::schedule_file::ScheduleFile;
use timetabler::core::io::traits::TimetableFile;
use timetabler::core::models::schedule::Schedule;
use timetabler::engine::progress::ProgressReporter;
use timetabler::workflows::generate::{self, GenerationOutcome};
use tracing::{debug, info, warn};

pub async fn run(args: GenerateArgs) -> Result<()> {
    info!("Resolving engine configuration...");
    let config = build_config(&args.engine, args.time_limit)?;
    let snapshot = load_snapshot(&args.input)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Generating timetable for {} section(s) (time limit {}s)...",
        snapshot.sections().len(),
        config.time_limit.as_secs()
    );
    info!("Invoking the core generation workflow...");

    let outcome = generate::run_async(snapshot, config, reporter).await?;
    debug!(phases = ?progress_handler.completed_phases(), "Generation phases completed.");

    match outcome {
        GenerationOutcome::Schedule(schedule) => {
            info!("Workflow produced {} lesson(s).", schedule.len());
            write_schedule(&schedule, args.output.as_deref())
        }
        GenerationOutcome::Diagnostics(report) => {
            warn!("Workflow finished without a timetable.");
            print_report(&report);
            Err(CliError::Infeasible {
                count: report.len(),
            })
        }
    }
}

fn write_schedule(schedule: &Schedule, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            ScheduleFile::write_to_path(schedule, path).map_err(|e| CliError::FileWriting {
                path: path.to_path_buf(),
                source: e.into(),
            })?;
            println!(
                "✓ Timetable with {} lesson(s) written to: {}",
                schedule.len(),
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            ScheduleFile::write_to(schedule, &mut stdout).map_err(|e| CliError::Other(e.into()))?;
        }
    }
    Ok(())
}
