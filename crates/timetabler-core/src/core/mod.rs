//! # Core Module
//!
//! Stateless building blocks of the timetable engine: the entity model the engine
//! reads, the schedule it produces, and file formats for exchanging both with
//! callers.
//!
//! ## Architecture
//!
//! - **Domain Model** ([`models`]) - Teachers, subjects, class sections, assignments,
//!   weekly requirements, concurrent sets, the immutable [`models::snapshot::Snapshot`]
//!   and the resulting [`models::schedule::Schedule`]
//! - **File I/O** ([`io`]) - TOML snapshot input and schedule output
//!
//! Nothing in this module performs search; see [`crate::engine`] for that.

pub mod io;
pub mod models;
