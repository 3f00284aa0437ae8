use super::model_building::ModelBuildResult;
use crate::engine::context::GenerationContext;
use crate::engine::cp::{CpSolution, CpSolver, SolverConfig};
use tracing::{info, instrument};

/// Hands the built model to `solver` under the configured time budget.
///
/// The search reports no progress events while it runs.
#[instrument(skip_all, name = "search_task")]
pub fn run(
    context: &GenerationContext,
    build: &ModelBuildResult,
    solver: &dyn CpSolver,
) -> CpSolution {
    let config = SolverConfig {
        time_limit: context.config.time_limit,
    };
    info!(
        time_limit_secs = config.time_limit.as_secs_f64(),
        int_vars = build.model.num_int_vars(),
        "Searching for a timetable."
    );

    let solution = solver.solve(&build.model, &config);

    info!(
        status = ?solution.status,
        elapsed_secs = solution.solve_time.as_secs_f64(),
        branches = solution.branches,
        "Search finished."
    );
    solution
}
