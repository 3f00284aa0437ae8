//! Decision variables of a constraint model.

use slotmap::new_key_type;

new_key_type! {
    pub struct IntVarId;
    pub struct IntervalVarId;
    pub struct BoolVarId;
}

/// An integer variable over an explicit, sorted set of values.
///
/// Timetable slots are rarely contiguous (shorter school days leave holes in
/// the shared week axis), so the domain is a value list rather than bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVar {
    pub name: String,
    domain: Vec<i64>,
}

impl IntVar {
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = i64>) -> Self {
        let mut domain: Vec<i64> = values.into_iter().collect();
        domain.sort_unstable();
        domain.dedup();
        Self {
            name: name.into(),
            domain,
        }
    }

    pub fn domain(&self) -> &[i64] {
        &self.domain
    }

    pub fn contains(&self, value: i64) -> bool {
        self.domain.binary_search(&value).is_ok()
    }

    pub fn min(&self) -> Option<i64> {
        self.domain.first().copied()
    }

    pub fn max(&self) -> Option<i64> {
        self.domain.last().copied()
    }
}

/// A fixed-length interval whose start is an integer variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalVar {
    pub name: String,
    pub start: IntVarId,
    pub length: i64,
}

impl IntervalVar {
    pub fn new(name: impl Into<String>, start: IntVarId, length: i64) -> Self {
        Self {
            name: name.into(),
            start,
            length,
        }
    }
}

/// A boolean literal. Its meaning comes from the reification that defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolVar {
    pub name: String,
}

impl BoolVar {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_is_sorted_and_deduplicated() {
        let var = IntVar::new("x", [8, 1, 3, 1, 0]);
        assert_eq!(var.domain(), &[0, 1, 3, 8]);
        assert!(var.contains(3));
        assert!(!var.contains(2));
        assert_eq!((var.min(), var.max()), (Some(0), Some(8)));
    }

    #[test]
    fn empty_domain_has_no_bounds() {
        let var = IntVar::new("x", []);
        assert_eq!(var.min(), None);
        assert_eq!(var.max(), None);
    }
}
