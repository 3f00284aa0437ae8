pub mod check;
pub mod generate;
pub mod verify;

use crate::error::{CliError, Result};
use std::path::Path;
use timetabler::core::io::snapshot_file::SnapshotFile;
use timetabler::core::io::traits::TimetableFile;
use timetabler::core::models::snapshot::Snapshot;
use timetabler::engine::diagnostics::{DiagnosticReport, ScanMode};
use tracing::info;

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    info!("Loading snapshot from {:?}", path);
    let snapshot = SnapshotFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    info!(
        teachers = snapshot.teachers().len(),
        sections = snapshot.sections().len(),
        requirements = snapshot.requirements().len(),
        "Snapshot loaded."
    );
    Ok(snapshot)
}

fn print_report(report: &DiagnosticReport) {
    let heading = match report.mode() {
        ScanMode::PreSolve => "Structural problems found before search:",
        ScanMode::Deep => "Search failed. Likely causes:",
    };
    println!("{}", heading);
    for finding in report {
        println!("  ✗ {}", finding);
    }
}
