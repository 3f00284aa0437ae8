//! The computational steps of one generation run.
//!
//! Each submodule exposes a `run` function taking the shared
//! [`GenerationContext`](super::context::GenerationContext): the structural
//! diagnostic scan, translation of the snapshot into a constraint model, the
//! search itself, and extraction of the solved model into a schedule.

pub mod diagnostic_scan;
pub mod extraction;
pub mod model_building;
pub mod search;
