//! # Engine Module
//!
//! The stateful layer that turns a [`Snapshot`](crate::core::models::snapshot::Snapshot)
//! into either a timetable or a list of findings explaining why none exists.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Search budget, daily cap and load ceilings
//! - **Diagnostics** ([`diagnostics`]) - Findings and the reports built from them
//! - **Constraint Backend** ([`cp`]) - Generic model, validation and backtracking solver
//! - **Tasks** ([`tasks`]) - Diagnostic scan, model building, search and extraction steps
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine faults, kept apart from infeasibility findings
//!
//! Model building is single-threaded and deterministic: the same snapshot always
//! yields the same model, and the bundled solver explores it in the same order.

pub mod config;
pub mod context;
pub mod cp;
pub mod diagnostics;
pub mod error;
pub mod progress;
pub mod tasks;
