//! Complete depth-first search with forward checking.

use super::compiled::CompiledModel;
use super::model::CpModel;
use super::solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};
use std::time::{Duration, Instant};
use tracing::debug;

/// Depth-first search with forward checking.
///
/// Variables joined by `AllEqual` are merged into one class before search, so a
/// synchronized group is decided with a single choice. At every node the
/// unassigned class with the fewest remaining values is branched on (ties go to
/// the class touching most constraints), values falling into the least-filled
/// `LinearAtMost` ranges are tried first (then ascending), and a node fails as
/// soon as some class has no value left. Exhausting the search proves
/// infeasibility; with a branch limit set the solver may instead give up with
/// [`SolverStatus::Unknown`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktrackingSolver {
    branch_limit: Option<u64>,
}

impl BacktrackingSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops after `limit` values have been tried.
    pub fn with_branch_limit(mut self, limit: u64) -> Self {
        self.branch_limit = Some(limit);
        self
    }
}

impl CpSolver for BacktrackingSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();
        if model.validate().is_err() {
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }

        let mut solution = match CompiledModel::compile(model) {
            Some(compiled) => {
                let mut search = Search::new(&compiled, self.branch_limit);
                let outcome = search.descend(started, config.time_limit);
                debug!(
                    classes = compiled.num_classes(),
                    branches = search.branches,
                    ?outcome,
                    "Backtracking search finished."
                );
                let mut solution = match outcome {
                    Outcome::Found => compiled.solution(model, &search.assignment),
                    Outcome::Exhausted => CpSolution::empty(SolverStatus::Infeasible),
                    Outcome::TimedOut => CpSolution::empty(SolverStatus::Timeout),
                    Outcome::GaveUp => CpSolution::empty(SolverStatus::Unknown),
                };
                solution.branches = search.branches;
                solution
            }
            None => CpSolution::empty(SolverStatus::Infeasible),
        };
        solution.solve_time = started.elapsed();
        solution
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Found,
    Exhausted,
    TimedOut,
    GaveUp,
}

/// Partial assignment over the classes of a [`CompiledModel`].
struct Search<'a> {
    model: &'a CompiledModel,
    occupancy: Vec<Vec<bool>>,
    counters: Vec<i64>,
    assignment: Vec<Option<i64>>,
    branches: u64,
    branch_limit: Option<u64>,
}

impl<'a> Search<'a> {
    fn new(model: &'a CompiledModel, branch_limit: Option<u64>) -> Self {
        Self {
            occupancy: vec![vec![false; model.horizon]; model.num_resources()],
            counters: vec![0; model.bounds.len()],
            assignment: vec![None; model.num_classes()],
            branches: 0,
            branch_limit,
            model,
        }
    }

    fn is_consistent(&self, class: usize, value: i64) -> bool {
        for &(resource, length) in &self.model.occupies[class] {
            let cells = &self.occupancy[resource];
            if (value..value + length).any(|t| cells[t as usize]) {
                return false;
            }
        }

        let mut pending: Option<(usize, i64)> = None;
        for &(counter, min, max) in &self.model.counts_toward[class] {
            if !(min..=max).contains(&value) {
                continue;
            }
            let added = match pending {
                Some((c, n)) if c == counter => n + 1,
                _ => 1,
            };
            if self.counters[counter] + added > self.model.bounds[counter] {
                return false;
            }
            pending = Some((counter, added));
        }
        true
    }

    /// How full the counted ranges a value would fall into already are.
    fn pressure(&self, class: usize, value: i64) -> i64 {
        self.model.counts_toward[class]
            .iter()
            .filter(|&&(_, min, max)| (min..=max).contains(&value))
            .map(|&(counter, _, _)| self.counters[counter])
            .sum()
    }

    fn apply(&mut self, class: usize, value: i64, delta: i64) {
        let occupied = delta > 0;
        for &(resource, length) in &self.model.occupies[class] {
            for t in value..value + length {
                self.occupancy[resource][t as usize] = occupied;
            }
        }
        for &(counter, min, max) in &self.model.counts_toward[class] {
            if (min..=max).contains(&value) {
                self.counters[counter] += delta;
            }
        }
        self.assignment[class] = occupied.then_some(value);
    }

    /// Picks the next class to branch on. `Err` means some class has no value left.
    fn select(&self) -> Result<Option<(usize, Vec<i64>)>, ()> {
        let mut best: Option<(usize, Vec<i64>)> = None;
        for class in (0..self.model.num_classes()).filter(|&c| self.assignment[c].is_none()) {
            let values: Vec<i64> = self.model.domains[class]
                .iter()
                .copied()
                .filter(|&v| self.is_consistent(class, v))
                .collect();
            if values.is_empty() {
                return Err(());
            }
            let better = match &best {
                None => true,
                Some((b, bv)) => {
                    values.len() < bv.len()
                        || (values.len() == bv.len()
                            && self.model.degree[class] > self.model.degree[*b])
                }
            };
            if better {
                best = Some((class, values));
            }
        }
        Ok(best)
    }

    fn descend(&mut self, started: Instant, time_limit: Duration) -> Outcome {
        let (class, mut values) = match self.select() {
            Err(()) => return Outcome::Exhausted,
            Ok(None) => return Outcome::Found,
            Ok(Some(choice)) => choice,
        };
        values.sort_by_key(|&v| (self.pressure(class, v), v));
        for value in values {
            if started.elapsed() >= time_limit {
                return Outcome::TimedOut;
            }
            if self.branch_limit.is_some_and(|limit| self.branches >= limit) {
                return Outcome::GaveUp;
            }
            self.branches += 1;
            self.apply(class, value, 1);
            match self.descend(started, time_limit) {
                Outcome::Exhausted => self.apply(class, value, -1),
                done => return done,
            }
        }
        Outcome::Exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(model: &CpModel) -> CpSolution {
        BacktrackingSolver::new().solve(model, &SolverConfig::default())
    }

    #[test]
    fn places_non_overlapping_unit_intervals() {
        let mut model = CpModel::new("three", 3);
        let vars: Vec<_> = (0..3).map(|i| model.new_int_var(format!("x{i}"), 0..3)).collect();
        let intervals = vars
            .iter()
            .map(|&v| model.new_interval("i", v, 1))
            .collect();
        model.add_no_overlap(intervals);

        let solution = solve(&model);
        assert!(solution.is_solution_found());
        let mut values: Vec<i64> = vars.iter().map(|&v| solution.value(v).unwrap()).collect();
        values.sort();
        assert_eq!(values, vec![0, 1, 2]);
    }

    #[test]
    fn pigeonhole_is_infeasible() {
        let mut model = CpModel::new("pigeons", 2);
        let intervals = (0..3)
            .map(|i| {
                let v = model.new_int_var(format!("x{i}"), 0..2);
                model.new_interval("i", v, 1)
            })
            .collect();
        model.add_no_overlap(intervals);
        assert_eq!(solve(&model).status, SolverStatus::Infeasible);
    }

    #[test]
    fn equal_variables_share_one_value_across_resources() {
        let mut model = CpModel::new("sync", 4);
        let a = model.new_int_var("a", 0..4);
        let b = model.new_int_var("b", [1, 3]);
        let blocker = model.new_int_var("blocker", [1]);
        let ia = model.new_interval("ia", a, 1);
        let ib = model.new_interval("ib", b, 1);
        let ibl = model.new_interval("iblocker", blocker, 1);
        model.add_no_overlap(vec![ib, ibl]);
        model.add_no_overlap(vec![ia]);
        model.add_all_equal(vec![a, b]);

        let solution = solve(&model);
        assert!(solution.is_solution_found());
        assert_eq!(solution.value(a), Some(3));
        assert_eq!(solution.value(b), Some(3));
    }

    #[test]
    fn equal_variables_on_one_resource_are_infeasible() {
        let mut model = CpModel::new("clash", 5);
        let a = model.new_int_var("a", 0..5);
        let b = model.new_int_var("b", 0..5);
        let ia = model.new_interval("ia", a, 1);
        let ib = model.new_interval("ib", b, 1);
        model.add_no_overlap(vec![ia, ib]);
        model.add_all_equal(vec![a, b]);
        assert_eq!(solve(&model).status, SolverStatus::Infeasible);
    }

    #[test]
    fn reified_counts_respect_the_bound() {
        let mut model = CpModel::new("cap", 6);
        let mut vars = Vec::new();
        let mut literals = Vec::new();
        let mut intervals = Vec::new();
        for i in 0..3 {
            let v = model.new_int_var(format!("x{i}"), 0..6);
            let l = model.new_bool_var(format!("early{i}"));
            model.add_reified_in_range(v, 0, 2, l);
            intervals.push(model.new_interval("i", v, 1));
            vars.push(v);
            literals.push(l);
        }
        model.add_no_overlap(intervals);
        model.add_linear_at_most(literals.clone(), 1);

        let solution = solve(&model);
        assert!(solution.is_solution_found());
        let early = vars
            .iter()
            .filter(|&&v| solution.value(v).unwrap() <= 2)
            .count();
        assert!(early <= 1);
        let true_literals = literals
            .iter()
            .filter(|&&l| solution.literal(l) == Some(true))
            .count();
        assert_eq!(true_literals, early);
    }

    #[test]
    fn zero_time_budget_times_out_when_work_remains() {
        let mut model = CpModel::new("busy", 2);
        model.new_int_var("x", 0..2);
        let config = SolverConfig {
            time_limit: Duration::ZERO,
        };
        let solution = BacktrackingSolver::new().solve(&model, &config);
        assert_eq!(solution.status, SolverStatus::Timeout);
    }

    #[test]
    fn exhausted_branch_limit_gives_up_without_a_verdict() {
        let mut model = CpModel::new("wide", 8);
        let intervals = (0..9)
            .map(|i| {
                let v = model.new_int_var(format!("x{i}"), 0..8);
                model.new_interval("i", v, 1)
            })
            .collect();
        model.add_no_overlap(intervals);

        let solution = BacktrackingSolver::new()
            .with_branch_limit(5)
            .solve(&model, &SolverConfig::default());

        assert_eq!(solution.status, SolverStatus::Unknown);
        assert_eq!(solution.branches, 5);
    }

    #[test]
    fn empty_model_is_trivially_feasible() {
        let model = CpModel::new("empty", 0);
        let config = SolverConfig {
            time_limit: Duration::ZERO,
        };
        let solution = BacktrackingSolver::new().solve(&model, &config);
        assert!(solution.is_solution_found());
    }

    #[test]
    fn invalid_model_is_reported_as_such() {
        let mut model = CpModel::new("bad", 3);
        let l = model.new_bool_var("free");
        model.add_linear_at_most(vec![l], 0);
        assert_eq!(solve(&model).status, SolverStatus::ModelInvalid);
    }
}
