//! Solver interface and the bundled portfolio of search backends.

use super::backtracking::BacktrackingSolver;
use super::model::CpModel;
use super::tabu::TabuSearchSolver;
use super::variables::{BoolVarId, IntVarId};
use slotmap::SecondaryMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible solution found.
    Feasible,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The model failed validation.
    ModelInvalid,
    /// The time budget ran out before the search concluded.
    Timeout,
    /// No solution found for unknown reasons.
    Unknown,
}

#[derive(Debug, Clone)]
pub struct CpSolution {
    pub status: SolverStatus,
    pub(super) int_values: SecondaryMap<IntVarId, i64>,
    pub(super) bool_values: SecondaryMap<BoolVarId, bool>,
    pub solve_time: Duration,
    /// Number of values tried or moves made during search.
    pub branches: u64,
}

impl CpSolution {
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            int_values: SecondaryMap::new(),
            bool_values: SecondaryMap::new(),
            solve_time: Duration::ZERO,
            branches: 0,
        }
    }

    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    pub fn value(&self, var: IntVarId) -> Option<i64> {
        self.int_values.get(var).copied()
    }

    pub fn literal(&self, var: BoolVarId) -> Option<bool> {
        self.bool_values.get(var).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Wall-clock budget for the whole solve.
    pub time_limit: Duration,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(60),
        }
    }
}

/// A constraint solver over [`CpModel`]s.
pub trait CpSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}

/// Share of the budget, as a divisor, given to the exact stage.
const EXACT_SHARE: u32 = 10;
const EXACT_BRANCH_FLOOR: u64 = 1_000;
const EXACT_BRANCHES_PER_VAR: u64 = 4;

/// Exact search first, tabu search for whatever budget is left.
///
/// The [`BacktrackingSolver`] stage gets a tenth of the budget and a branch
/// allowance proportional to the number of variables. It settles small or
/// loosely constrained models outright and proves infeasibility where it can.
/// A model it leaves open is handed to the [`TabuSearchSolver`], so a failure
/// after the handover is reported as [`SolverStatus::Timeout`] rather than
/// [`SolverStatus::Infeasible`].
#[derive(Debug, Clone, Default)]
pub struct PortfolioSolver {
    local: TabuSearchSolver,
    exact_branch_limit: Option<u64>,
}

impl PortfolioSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local_search(mut self, local: TabuSearchSolver) -> Self {
        self.local = local;
        self
    }

    /// Replaces the size-derived branch allowance of the exact stage.
    pub fn with_exact_branch_limit(mut self, limit: u64) -> Self {
        self.exact_branch_limit = Some(limit);
        self
    }
}

impl CpSolver for PortfolioSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();
        let branch_limit = self.exact_branch_limit.unwrap_or(
            EXACT_BRANCH_FLOOR + EXACT_BRANCHES_PER_VAR * model.num_int_vars() as u64,
        );
        let exact_config = SolverConfig {
            time_limit: config.time_limit / EXACT_SHARE,
        };
        let exact = BacktrackingSolver::new()
            .with_branch_limit(branch_limit)
            .solve(model, &exact_config);

        let mut solution = match exact.status {
            SolverStatus::Timeout | SolverStatus::Unknown => {
                debug!(
                    branches = exact.branches,
                    status = ?exact.status,
                    "Exact stage left the model open; continuing with tabu search."
                );
                let local_config = SolverConfig {
                    time_limit: config.time_limit.saturating_sub(started.elapsed()),
                };
                let mut local = self.local.solve(model, &local_config);
                local.branches += exact.branches;
                local
            }
            _ => exact,
        };
        solution.solve_time = started.elapsed();
        solution
    }
}
