use super::{load_snapshot, print_report};
use crate::cli::CheckArgs;
use crate::config::builder::build_config;
use crate::error::{CliError, Result};
use timetabler::engine::context::GenerationContext;
use timetabler::engine::diagnostics::{DiagnosticReport, ScanMode};
use timetabler::engine::progress::ProgressReporter;
use timetabler::engine::tasks::diagnostic_scan;
use tracing::info;

pub async fn run(args: CheckArgs) -> Result<()> {
    let config = build_config(&args.engine, None)?;
    let snapshot = load_snapshot(&args.input)?;

    let reporter = ProgressReporter::new();
    let context = GenerationContext::new(&snapshot, &config, &reporter);
    let findings = diagnostic_scan::run(&context, ScanMode::PreSolve);
    info!("Structural scan produced {} finding(s).", findings.len());

    match DiagnosticReport::new(ScanMode::PreSolve, findings) {
        None => {
            println!(
                "✓ No structural problems in {} requirement(s) across {} section(s).",
                snapshot.requirements().len(),
                snapshot.sections().len()
            );
            Ok(())
        }
        Some(report) => {
            print_report(&report);
            Err(CliError::Infeasible {
                count: report.len(),
            })
        }
    }
}
