//! Constraint model definition.

use super::variables::{BoolVar, BoolVarId, IntVar, IntVarId, IntervalVar, IntervalVarId};
use slotmap::{SecondaryMap, SlotMap};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ModelError {
    #[error("{constraint} references a {kind} that is not part of the model")]
    DanglingReference {
        constraint: &'static str,
        kind: &'static str,
    },

    #[error("Interval '{name}' must have a positive length, got {length}")]
    NonPositiveLength { name: String, length: i64 },

    #[error("Interval '{name}' may start at {start}, which runs past the horizon {horizon}")]
    OutsideHorizon {
        name: String,
        start: i64,
        horizon: i64,
    },

    #[error("Literal '{name}' is defined by more than one reification")]
    RedefinedLiteral { name: String },

    #[error("Literal '{name}' is summed but never defined")]
    UndefinedLiteral { name: String },
}

/// A constraint over the model's variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// No two of the intervals may share a time point.
    NoOverlap { intervals: Vec<IntervalVarId> },

    /// All variables take the same value.
    AllEqual { vars: Vec<IntVarId> },

    /// `literal` is true exactly when `min <= var <= max`.
    ReifiedInRange {
        var: IntVarId,
        min: i64,
        max: i64,
        literal: BoolVarId,
    },

    /// At most `bound` of the literals are true.
    LinearAtMost {
        literals: Vec<BoolVarId>,
        bound: i64,
    },
}

impl Constraint {
    fn kind(&self) -> &'static str {
        match self {
            Constraint::NoOverlap { .. } => "NoOverlap",
            Constraint::AllEqual { .. } => "AllEqual",
            Constraint::ReifiedInRange { .. } => "ReifiedInRange",
            Constraint::LinearAtMost { .. } => "LinearAtMost",
        }
    }
}

/// A satisfaction model over the time axis `[0, horizon)`.
///
/// Variables live in slot maps and are referenced by key, so constraints never
/// hold names or indices that could drift.
#[derive(Debug, Clone)]
pub struct CpModel {
    pub name: String,
    pub horizon: i64,
    int_vars: SlotMap<IntVarId, IntVar>,
    intervals: SlotMap<IntervalVarId, IntervalVar>,
    bool_vars: SlotMap<BoolVarId, BoolVar>,
    constraints: Vec<Constraint>,
}

impl CpModel {
    pub fn new(name: impl Into<String>, horizon: i64) -> Self {
        Self {
            name: name.into(),
            horizon,
            int_vars: SlotMap::with_key(),
            intervals: SlotMap::with_key(),
            bool_vars: SlotMap::with_key(),
            constraints: Vec::new(),
        }
    }

    pub fn new_int_var(
        &mut self,
        name: impl Into<String>,
        domain: impl IntoIterator<Item = i64>,
    ) -> IntVarId {
        self.int_vars.insert(IntVar::new(name, domain))
    }

    pub fn new_interval(
        &mut self,
        name: impl Into<String>,
        start: IntVarId,
        length: i64,
    ) -> IntervalVarId {
        self.intervals.insert(IntervalVar::new(name, start, length))
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVarId {
        self.bool_vars.insert(BoolVar::new(name))
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn add_no_overlap(&mut self, intervals: Vec<IntervalVarId>) {
        self.constraints.push(Constraint::NoOverlap { intervals });
    }

    pub fn add_all_equal(&mut self, vars: Vec<IntVarId>) {
        self.constraints.push(Constraint::AllEqual { vars });
    }

    pub fn add_reified_in_range(&mut self, var: IntVarId, min: i64, max: i64, literal: BoolVarId) {
        self.constraints.push(Constraint::ReifiedInRange {
            var,
            min,
            max,
            literal,
        });
    }

    pub fn add_linear_at_most(&mut self, literals: Vec<BoolVarId>, bound: i64) {
        self.constraints
            .push(Constraint::LinearAtMost { literals, bound });
    }

    pub fn int_var(&self, id: IntVarId) -> Option<&IntVar> {
        self.int_vars.get(id)
    }

    pub fn interval(&self, id: IntervalVarId) -> Option<&IntervalVar> {
        self.intervals.get(id)
    }

    pub fn bool_var(&self, id: BoolVarId) -> Option<&BoolVar> {
        self.bool_vars.get(id)
    }

    pub fn int_vars(&self) -> impl Iterator<Item = (IntVarId, &IntVar)> {
        self.int_vars.iter()
    }

    pub fn intervals(&self) -> impl Iterator<Item = (IntervalVarId, &IntervalVar)> {
        self.intervals.iter()
    }

    pub fn bool_vars(&self) -> impl Iterator<Item = (BoolVarId, &BoolVar)> {
        self.bool_vars.iter()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn num_int_vars(&self) -> usize {
        self.int_vars.len()
    }

    pub fn num_intervals(&self) -> usize {
        self.intervals.len()
    }

    pub fn num_bool_vars(&self) -> usize {
        self.bool_vars.len()
    }

    /// Checks that every reference resolves, every interval fits the horizon
    /// and every summed literal is defined exactly once.
    pub fn validate(&self) -> Result<(), ModelError> {
        for interval in self.intervals.values() {
            let start = self
                .int_vars
                .get(interval.start)
                .ok_or(ModelError::DanglingReference {
                    constraint: "Interval",
                    kind: "integer variable",
                })?;
            if interval.length <= 0 {
                return Err(ModelError::NonPositiveLength {
                    name: interval.name.clone(),
                    length: interval.length,
                });
            }
            let out_of_range = start
                .domain()
                .iter()
                .find(|&&s| s < 0 || s + interval.length > self.horizon);
            if let Some(&s) = out_of_range {
                return Err(ModelError::OutsideHorizon {
                    name: interval.name.clone(),
                    start: s,
                    horizon: self.horizon,
                });
            }
        }

        let mut defined: SecondaryMap<BoolVarId, ()> = SecondaryMap::new();
        for constraint in &self.constraints {
            let dangling = |kind| ModelError::DanglingReference {
                constraint: constraint.kind(),
                kind,
            };
            match constraint {
                Constraint::NoOverlap { intervals } => {
                    if intervals.iter().any(|&i| !self.intervals.contains_key(i)) {
                        return Err(dangling("interval"));
                    }
                }
                Constraint::AllEqual { vars } => {
                    if vars.iter().any(|&v| !self.int_vars.contains_key(v)) {
                        return Err(dangling("integer variable"));
                    }
                }
                Constraint::ReifiedInRange { var, literal, .. } => {
                    if !self.int_vars.contains_key(*var) {
                        return Err(dangling("integer variable"));
                    }
                    let Some(bool_var) = self.bool_vars.get(*literal) else {
                        return Err(dangling("literal"));
                    };
                    if defined.insert(*literal, ()).is_some() {
                        return Err(ModelError::RedefinedLiteral {
                            name: bool_var.name.clone(),
                        });
                    }
                }
                Constraint::LinearAtMost { literals, .. } => {
                    if literals.iter().any(|&l| !self.bool_vars.contains_key(l)) {
                        return Err(dangling("literal"));
                    }
                }
            }
        }

        for constraint in &self.constraints {
            if let Constraint::LinearAtMost { literals, .. } = constraint {
                if let Some(&undefined) = literals.iter().find(|&&l| !defined.contains_key(l)) {
                    return Err(ModelError::UndefinedLiteral {
                        name: self.bool_vars[undefined].name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
