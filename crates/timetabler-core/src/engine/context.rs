use super::config::EngineConfig;
use super::progress::ProgressReporter;
use crate::core::models::calendar::WeekGrid;
use crate::core::models::snapshot::Snapshot;

/// Read-only inputs shared by every task of one generation run.
#[derive(Clone, Copy)]
pub struct GenerationContext<'a> {
    pub snapshot: &'a Snapshot,
    pub config: &'a EngineConfig,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        snapshot: &'a Snapshot,
        config: &'a EngineConfig,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            snapshot,
            config,
            reporter,
        }
    }

    pub fn grid(&self) -> WeekGrid {
        self.snapshot.week_grid()
    }
}
