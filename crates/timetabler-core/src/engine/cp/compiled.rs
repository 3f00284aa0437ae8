//! Class-level flattening of a [`CpModel`] shared by the search backends.

use super::model::{Constraint, CpModel};
use super::solver::{CpSolution, SolverStatus};
use super::variables::{BoolVarId, IntVarId};
use slotmap::SecondaryMap;

struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb.max(ra)] = ra.min(rb);
        }
    }
}

/// Integer variables merged into equality classes, with every constraint
/// rewritten against class indices.
///
/// `NoOverlap` constraints become resources and `LinearAtMost` constraints
/// become counters; a class occupies a resource cell per unit of interval
/// length and bumps a counter when its value falls into a reified range.
pub(super) struct CompiledModel {
    pub var_class: SecondaryMap<IntVarId, usize>,
    pub domains: Vec<Vec<i64>>,
    /// Per class: (no-overlap resource, interval length).
    pub occupies: Vec<Vec<(usize, i64)>>,
    /// Per class, ordered by counter: (counter, min, max).
    pub counts_toward: Vec<Vec<(usize, i64, i64)>>,
    /// Per resource: the classes occupying it.
    pub members: Vec<Vec<usize>>,
    pub bounds: Vec<i64>,
    pub degree: Vec<usize>,
    pub horizon: usize,
}

impl CompiledModel {
    /// Returns `None` when the model is infeasible before any choice is made:
    /// an empty class domain, a class occupying one resource twice, or a
    /// negative counter bound.
    pub fn compile(model: &CpModel) -> Option<Self> {
        let var_ids: Vec<IntVarId> = model.int_vars().map(|(id, _)| id).collect();
        let mut index: SecondaryMap<IntVarId, usize> = SecondaryMap::new();
        for (i, &id) in var_ids.iter().enumerate() {
            index.insert(id, i);
        }

        let mut sets = DisjointSets::new(var_ids.len());
        for constraint in model.constraints() {
            if let Constraint::AllEqual { vars } = constraint {
                for pair in vars.windows(2) {
                    sets.union(index[pair[0]], index[pair[1]]);
                }
            }
        }

        let mut class_of_root = vec![usize::MAX; var_ids.len()];
        let mut domains: Vec<Vec<i64>> = Vec::new();
        let mut var_class = SecondaryMap::new();
        for (i, &id) in var_ids.iter().enumerate() {
            let root = sets.find(i);
            let domain = model.int_var(id)?.domain();
            let class = if class_of_root[root] == usize::MAX {
                class_of_root[root] = domains.len();
                domains.push(domain.to_vec());
                domains.len() - 1
            } else {
                let c = class_of_root[root];
                domains[c].retain(|v| domain.binary_search(v).is_ok());
                c
            };
            var_class.insert(id, class);
        }
        if domains.iter().any(Vec::is_empty) {
            return None;
        }

        let n = domains.len();
        let mut occupies: Vec<Vec<(usize, i64)>> = vec![Vec::new(); n];
        let mut members: Vec<Vec<usize>> = Vec::new();
        let mut reified: SecondaryMap<BoolVarId, (usize, i64, i64)> = SecondaryMap::new();
        for constraint in model.constraints() {
            match constraint {
                Constraint::NoOverlap { intervals } => {
                    let resource = members.len();
                    let mut on_resource = Vec::with_capacity(intervals.len());
                    for &interval_id in intervals {
                        let interval = model.interval(interval_id)?;
                        let class = var_class[interval.start];
                        if occupies[class].iter().any(|&(r, _)| r == resource) {
                            // Two intervals bound to one start always overlap.
                            return None;
                        }
                        occupies[class].push((resource, interval.length));
                        on_resource.push(class);
                    }
                    members.push(on_resource);
                }
                Constraint::ReifiedInRange {
                    var,
                    min,
                    max,
                    literal,
                } => {
                    reified.insert(*literal, (var_class[*var], *min, *max));
                }
                _ => {}
            }
        }

        let mut counts_toward: Vec<Vec<(usize, i64, i64)>> = vec![Vec::new(); n];
        let mut bounds = Vec::new();
        for constraint in model.constraints() {
            if let Constraint::LinearAtMost { literals, bound } = constraint {
                if *bound < 0 {
                    return None;
                }
                let counter = bounds.len();
                bounds.push(*bound);
                for &literal in literals {
                    let &(class, min, max) = reified.get(literal)?;
                    counts_toward[class].push((counter, min, max));
                }
            }
        }

        for entries in &mut counts_toward {
            entries.sort_by_key(|&(counter, _, _)| counter);
        }

        let degree = (0..n)
            .map(|c| occupies[c].len() + counts_toward[c].len())
            .collect();

        Some(Self {
            var_class,
            domains,
            occupies,
            counts_toward,
            members,
            bounds,
            degree,
            horizon: model.horizon.max(0) as usize,
        })
    }

    pub fn num_classes(&self) -> usize {
        self.domains.len()
    }

    pub fn num_resources(&self) -> usize {
        self.members.len()
    }

    /// Expands one value per class back to the model's variables and derives
    /// every reified literal from them.
    pub fn solution(&self, model: &CpModel, values: &[Option<i64>]) -> CpSolution {
        let mut solution = CpSolution::empty(SolverStatus::Feasible);
        for (id, &class) in &self.var_class {
            if let Some(value) = values[class] {
                solution.int_values.insert(id, value);
            }
        }
        for (id, _) in model.bool_vars() {
            solution.bool_values.insert(id, false);
        }
        for constraint in model.constraints() {
            if let Constraint::ReifiedInRange {
                var,
                min,
                max,
                literal,
            } = constraint
            {
                let holds = solution
                    .value(*var)
                    .is_some_and(|v| (*min..=*max).contains(&v));
                solution.bool_values.insert(*literal, holds);
            }
        }
        solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_chains_collapse_into_one_class() {
        let mut model = CpModel::new("chain", 4);
        let a = model.new_int_var("a", 0..4);
        let b = model.new_int_var("b", 1..4);
        let c = model.new_int_var("c", [0, 2, 3]);
        let d = model.new_int_var("d", 0..4);
        model.add_all_equal(vec![a, b]);
        model.add_all_equal(vec![b, c]);

        let compiled = CompiledModel::compile(&model).unwrap();

        assert_eq!(compiled.num_classes(), 2);
        let class = compiled.var_class[a];
        assert_eq!(compiled.var_class[c], class);
        assert_ne!(compiled.var_class[d], class);
        assert_eq!(compiled.domains[class], vec![2, 3]);
    }

    #[test]
    fn resources_list_their_members() {
        let mut model = CpModel::new("room", 3);
        let a = model.new_int_var("a", 0..3);
        let b = model.new_int_var("b", 0..3);
        let ia = model.new_interval("ia", a, 1);
        let ib = model.new_interval("ib", b, 1);
        model.add_no_overlap(vec![ia, ib]);

        let compiled = CompiledModel::compile(&model).unwrap();

        assert_eq!(compiled.num_resources(), 1);
        assert_eq!(compiled.members[0].len(), 2);
        assert_eq!(compiled.horizon, 3);
    }

    #[test]
    fn disjoint_equal_domains_fail_to_compile() {
        let mut model = CpModel::new("split", 4);
        let a = model.new_int_var("a", [0, 1]);
        let b = model.new_int_var("b", [2, 3]);
        model.add_all_equal(vec![a, b]);

        assert!(CompiledModel::compile(&model).is_none());
    }
}
