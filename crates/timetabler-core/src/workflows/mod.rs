//! # Workflows Module
//!
//! High-level entry points that run a complete timetable generation.
//!
//! - **Generation Workflow** ([`generate`]) - Pre-solve diagnostics, model building,
//!   search, and either extraction of a verified schedule or deep diagnostics.
//!   Available synchronously ([`generate::run`]) and on tokio's blocking pool
//!   ([`generate::run_async`]).

pub mod generate;
