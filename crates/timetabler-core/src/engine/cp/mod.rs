//! Constraint programming backend.
//!
//! A small satisfaction layer sized to the timetable problem: integer start
//! variables over explicit slot lists, unit intervals anchored on them, and four
//! constraint kinds (`NoOverlap`, `AllEqual`, `ReifiedInRange`, `LinearAtMost`).
//!
//! - **Variables** ([`IntVar`], [`IntervalVar`], [`BoolVar`]) are stored in slot
//!   maps and referenced by typed keys.
//! - **Model** ([`CpModel`]) owns variables and constraints and validates references.
//! - **Solver** ([`CpSolver`]) is the seam for search backends.
//!   [`BacktrackingSolver`] is complete and can prove infeasibility,
//!   [`TabuSearchSolver`] repairs large tight models, and [`PortfolioSolver`]
//!   runs the first and then the second.

mod backtracking;
mod compiled;
mod model;
mod solver;
mod tabu;
mod variables;

pub use backtracking::BacktrackingSolver;
pub use model::{Constraint, CpModel, ModelError};
pub use solver::{CpSolution, CpSolver, PortfolioSolver, SolverConfig, SolverStatus};
pub use tabu::TabuSearchSolver;
pub use variables::{BoolVar, BoolVarId, IntVar, IntVarId, IntervalVar, IntervalVarId};
