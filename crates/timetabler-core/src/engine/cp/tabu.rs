//! Min-conflicts tabu search over equality classes.

use super::compiled::CompiledModel;
use super::model::CpModel;
use super::solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Local search that repairs a complete assignment.
///
/// Every class always holds a value. The cost of an assignment is the number of
/// doubly occupied resource cells plus the total excess over the counter bounds,
/// and a cost of zero is a solution. Each iteration samples up to
/// `neighbourhood` classes involved in a violation and evaluates, for each, every
/// other value of its domain and every value swap with a class sharing one of
/// its resources. The best admissible move is taken even when it worsens the
/// cost. A move is tabu when it returns a class to a value it recently left; it
/// is still admissible when it beats the best cost seen so far. The tenure is a
/// random draw up to `tabu_tenure` plus a share of the violating classes.
///
/// After `max_no_improve` iterations without a new best the walk restarts from
/// the best assignment with a few random kicks. The search cannot prove
/// infeasibility and reports [`SolverStatus::Timeout`] when the budget runs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabuSearchSolver {
    /// Upper bound of the random part of the tenure, in iterations.
    pub tabu_tenure: u64,
    /// Violating classes examined per iteration.
    pub neighbourhood: usize,
    /// Iterations without a new best before restarting from it.
    pub max_no_improve: u64,
    pub seed: u64,
}

impl Default for TabuSearchSolver {
    fn default() -> Self {
        Self {
            tabu_tenure: 10,
            neighbourhood: 12,
            max_no_improve: 2_000,
            seed: 42,
        }
    }
}

impl TabuSearchSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tabu_tenure(mut self, tenure: u64) -> Self {
        self.tabu_tenure = tenure;
        self
    }

    pub fn with_neighbourhood(mut self, classes: usize) -> Self {
        self.neighbourhood = classes;
        self
    }

    pub fn with_max_no_improve(mut self, iterations: u64) -> Self {
        self.max_no_improve = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl CpSolver for TabuSearchSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();
        if model.validate().is_err() {
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }

        let mut solution = match CompiledModel::compile(model) {
            Some(compiled) => {
                let mut rng = StdRng::seed_from_u64(self.seed);
                let mut walk = Walk::start(&compiled, &mut rng);
                let outcome = walk.run(self, &mut rng, started, config.time_limit);
                debug!(
                    classes = compiled.num_classes(),
                    moves = walk.moves,
                    restarts = walk.restarts,
                    cost = walk.cost,
                    ?outcome,
                    "Tabu search finished."
                );
                let mut solution = match outcome {
                    Outcome::Found => {
                        let values: Vec<Option<i64>> = walk.values.iter().copied().map(Some).collect();
                        compiled.solution(model, &values)
                    }
                    Outcome::TimedOut => CpSolution::empty(SolverStatus::Timeout),
                    Outcome::Stuck => CpSolution::empty(SolverStatus::Unknown),
                };
                solution.branches = walk.moves;
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
    TimedOut,
    /// No class has another value to take.
    Stuck,
}

#[derive(Debug, Clone, Copy)]
enum Move {
    Reassign { class: usize, to: i64 },
    Swap { class: usize, other: usize },
}

/// Best move offered so far, ties broken uniformly at random.
struct Candidate {
    delta: i64,
    ties: u32,
    chosen: Option<Move>,
}

impl Candidate {
    fn new() -> Self {
        Self {
            delta: i64::MAX,
            ties: 0,
            chosen: None,
        }
    }

    fn offer<R: Rng>(&mut self, mv: Move, delta: i64, rng: &mut R) {
        if delta < self.delta {
            self.delta = delta;
            self.ties = 1;
            self.chosen = Some(mv);
        } else if delta == self.delta {
            self.ties += 1;
            if rng.random_range(0..self.ties) == 0 {
                self.chosen = Some(mv);
            }
        }
    }
}

/// A complete assignment with incrementally maintained violation counts.
struct Walk<'a> {
    model: &'a CompiledModel,
    values: Vec<i64>,
    /// Per resource and cell: how many classes occupy it.
    occupancy: Vec<Vec<u32>>,
    counters: Vec<i64>,
    cost: i64,
    /// (class, value) pairs a class may not return to before the given iteration.
    tabu: HashMap<(usize, i64), u64>,
    moves: u64,
    restarts: u64,
}

impl<'a> Walk<'a> {
    /// Greedy construction: most constrained classes first, each taking the
    /// value that adds the fewest violations.
    fn start<R: Rng>(model: &'a CompiledModel, rng: &mut R) -> Self {
        let mut walk = Self {
            values: vec![0; model.num_classes()],
            occupancy: vec![vec![0; model.horizon]; model.num_resources()],
            counters: vec![0; model.bounds.len()],
            cost: 0,
            tabu: HashMap::new(),
            moves: 0,
            restarts: 0,
            model,
        };

        let mut order: Vec<usize> = (0..model.num_classes()).collect();
        order.sort_by_key(|&c| (model.domains[c].len(), Reverse(model.degree[c])));
        for class in order {
            let mut best = Candidate::new();
            for &value in &model.domains[class] {
                let delta = walk.place(class, value);
                walk.lift(class);
                best.offer(Move::Reassign { class, to: value }, delta, rng);
            }
            if let Some(Move::Reassign { to, .. }) = best.chosen {
                walk.place(class, to);
            }
        }
        walk
    }

    fn place(&mut self, class: usize, value: i64) -> i64 {
        let model = self.model;
        let mut delta = 0;
        for &(resource, length) in &model.occupies[class] {
            for t in value..value + length {
                let cell = &mut self.occupancy[resource][t as usize];
                if *cell >= 1 {
                    delta += 1;
                }
                *cell += 1;
            }
        }
        for &(counter, min, max) in &model.counts_toward[class] {
            if (min..=max).contains(&value) {
                self.counters[counter] += 1;
                if self.counters[counter] > model.bounds[counter] {
                    delta += 1;
                }
            }
        }
        self.values[class] = value;
        self.cost += delta;
        delta
    }

    fn lift(&mut self, class: usize) -> i64 {
        let model = self.model;
        let value = self.values[class];
        let mut delta = 0;
        for &(resource, length) in &model.occupies[class] {
            for t in value..value + length {
                let cell = &mut self.occupancy[resource][t as usize];
                if *cell >= 2 {
                    delta -= 1;
                }
                *cell -= 1;
            }
        }
        for &(counter, min, max) in &model.counts_toward[class] {
            if (min..=max).contains(&value) {
                if self.counters[counter] > model.bounds[counter] {
                    delta -= 1;
                }
                self.counters[counter] -= 1;
            }
        }
        self.cost += delta;
        delta
    }

    fn shift(&mut self, class: usize, to: i64) -> i64 {
        self.lift(class) + self.place(class, to)
    }

    /// Cost change of moving `class` to `to`, computed without moving it.
    fn reassign_delta(&self, class: usize, to: i64) -> i64 {
        let model = self.model;
        let from = self.values[class];
        let mut delta = 0;
        for &(resource, length) in &model.occupies[class] {
            let cells = &self.occupancy[resource];
            let (left, entered) = (from..from + length, to..to + length);
            for t in left.clone() {
                if !entered.contains(&t) && cells[t as usize] >= 2 {
                    delta -= 1;
                }
            }
            for t in entered {
                if !left.contains(&t) && cells[t as usize] >= 1 {
                    delta += 1;
                }
            }
        }
        for entries in model.counts_toward[class].chunk_by(|a, b| a.0 == b.0) {
            let counter = entries[0].0;
            let net: i64 = entries
                .iter()
                .map(|&(_, min, max)| {
                    i64::from((min..=max).contains(&to)) - i64::from((min..=max).contains(&from))
                })
                .sum();
            if net != 0 {
                let (count, bound) = (self.counters[counter], model.bounds[counter]);
                delta += (count + net - bound).max(0) - (count - bound).max(0);
            }
        }
        delta
    }

    fn is_conflicted(&self, class: usize) -> bool {
        let model = self.model;
        let value = self.values[class];
        let overlapping = model.occupies[class].iter().any(|&(resource, length)| {
            (value..value + length).any(|t| self.occupancy[resource][t as usize] >= 2)
        });
        overlapping
            || model.counts_toward[class].iter().any(|&(counter, min, max)| {
                (min..=max).contains(&value) && self.counters[counter] > model.bounds[counter]
            })
    }

    fn is_tabu(&self, class: usize, value: i64, iteration: u64) -> bool {
        self.tabu
            .get(&(class, value))
            .is_some_and(|&until| until > iteration)
    }

    fn allows(&self, class: usize, value: i64) -> bool {
        self.model.domains[class].binary_search(&value).is_ok()
    }

    /// Evaluates every move for `classes`. Swaps are applied and undone.
    fn best_move<R: Rng>(
        &mut self,
        classes: &[usize],
        iteration: u64,
        best_cost: i64,
        rng: &mut R,
    ) -> Option<Move> {
        let model = self.model;
        let mut admissible = Candidate::new();
        let mut fallback = Candidate::new();

        for &class in classes {
            let from = self.values[class];
            for &to in &model.domains[class] {
                if to == from {
                    continue;
                }
                let delta = self.reassign_delta(class, to);
                let mv = Move::Reassign { class, to };
                if !self.is_tabu(class, to, iteration) || self.cost + delta < best_cost {
                    admissible.offer(mv, delta, rng);
                } else {
                    fallback.offer(mv, delta, rng);
                }
            }

            for &(resource, _) in &model.occupies[class] {
                for &other in &model.members[resource] {
                    let to = self.values[other];
                    if other == class
                        || to == from
                        || !self.allows(class, to)
                        || !self.allows(other, from)
                    {
                        continue;
                    }
                    let delta = self.shift(class, to) + self.shift(other, from);
                    self.shift(other, to);
                    self.shift(class, from);
                    let mv = Move::Swap { class, other };
                    let tabu =
                        self.is_tabu(class, to, iteration) || self.is_tabu(other, from, iteration);
                    if !tabu || self.cost + delta < best_cost {
                        admissible.offer(mv, delta, rng);
                    } else {
                        fallback.offer(mv, delta, rng);
                    }
                }
            }
        }
        admissible.chosen.or(fallback.chosen)
    }

    fn commit(&mut self, mv: Move, until: u64) {
        match mv {
            Move::Reassign { class, to } => {
                let from = self.values[class];
                self.shift(class, to);
                self.tabu.insert((class, from), until);
            }
            Move::Swap { class, other } => {
                let (a, b) = (self.values[class], self.values[other]);
                self.shift(class, b);
                self.shift(other, a);
                self.tabu.insert((class, a), until);
                self.tabu.insert((other, b), until);
            }
        }
        self.moves += 1;
    }

    fn restart<R: Rng>(&mut self, best: &[i64], rng: &mut R) {
        for (class, &value) in best.iter().enumerate() {
            if self.values[class] != value {
                self.shift(class, value);
            }
        }
        self.tabu.clear();
        let n = self.values.len();
        for _ in 0..=n / 25 {
            let class = rng.random_range(0..n);
            let domain = &self.model.domains[class];
            let value = domain[rng.random_range(0..domain.len())];
            self.shift(class, value);
        }
        self.restarts += 1;
    }

    fn run<R: Rng>(
        &mut self,
        params: &TabuSearchSolver,
        rng: &mut R,
        started: Instant,
        time_limit: Duration,
    ) -> Outcome {
        let mut best_cost = self.cost;
        let mut best_values = self.values.clone();
        let mut stalled = 0;
        let mut iteration = 0;

        loop {
            if started.elapsed() >= time_limit {
                return Outcome::TimedOut;
            }
            if self.cost == 0 {
                return Outcome::Found;
            }

            let conflicted: Vec<usize> = (0..self.values.len())
                .filter(|&c| self.is_conflicted(c))
                .collect();
            let tenure = rng.random_range(0..=params.tabu_tenure) + conflicted.len() as u64 * 3 / 5;
            let sampled = sample(conflicted, params.neighbourhood.max(1), rng);
            let Some(mv) = self.best_move(&sampled, iteration, best_cost, rng) else {
                return Outcome::Stuck;
            };
            self.commit(mv, iteration + tenure + 1);
            iteration += 1;

            if self.cost < best_cost {
                best_cost = self.cost;
                best_values.clone_from(&self.values);
                stalled = 0;
            } else {
                stalled += 1;
                if stalled >= params.max_no_improve && self.cost > 0 {
                    self.restart(&best_values, rng);
                    stalled = 0;
                }
            }
        }
    }
}

/// Keeps at most `size` of `classes`, chosen uniformly.
fn sample<R: Rng>(mut classes: Vec<usize>, size: usize, rng: &mut R) -> Vec<usize> {
    if classes.len() > size {
        for i in 0..size {
            let j = rng.random_range(i..classes.len());
            classes.swap(i, j);
        }
        classes.truncate(size);
    }
    classes
}
