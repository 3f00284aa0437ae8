use thiserror::Error;

use super::config::ConfigError;
use super::cp::ModelError;
use crate::core::models::snapshot::SnapshotError;

/// Failures of the engine itself.
///
/// An infeasible timetable is not an error: it is reported as a
/// [`DiagnosticReport`](super::diagnostics::DiagnosticReport).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid engine configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Constraint model is malformed: {source}")]
    Model {
        #[from]
        source: ModelError,
    },

    #[error("Failed to extract schedule: {0}")]
    Extraction(String),

    #[error("Generation worker failed: {0}")]
    Worker(String),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
