//! # Timetabler Core Library
//!
//! Generates weekly school timetables: every class-section receives its required
//! lessons, no section or teacher is in two places at once, electives grouped in
//! concurrent sets meet simultaneously, and no subject is crammed into one day.
//! When no timetable can exist, the library explains why instead.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Snapshot`, `Schedule`,
//!   the `WeekGrid` time axis) and TOML file I/O for snapshots and schedules.
//!
//! - **[`engine`]: The Logic Core.** Structural diagnostics, translation of a
//!   snapshot into a constraint model, a generic constraint-programming backend
//!   with a complete backtracking solver, and extraction of solved models.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into one
//!   generation run that yields either a verified schedule or a diagnostic report.

pub mod core;
pub mod engine;
pub mod workflows;
