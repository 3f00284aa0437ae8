use super::ids::TeacherId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marks the start of the disambiguation counter appended to a teacher's name,
/// as in `"Suman Sharma (2)"`.
const DISAMBIGUATION_SUFFIX_START: &str = " (";

/// Normalized identity of the physical person behind one or more [`Teacher`] records.
///
/// Several teacher records may describe the same human, distinguished only by a
/// parenthesized counter on the display name. Workload and overlap rules operate
/// on the person, so every record carries the key of the person it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HumanKey(String);

impl HumanKey {
    /// Derives the key from a teacher display name.
    ///
    /// Everything from the first `" ("` onwards is discarded. Names without the
    /// suffix map to themselves.
    pub fn from_name(name: &str) -> Self {
        let base = name
            .split_once(DISAMBIGUATION_SUFFIX_START)
            .map_or(name, |(base, _)| base);
        Self(base.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HumanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    human_key: HumanKey,
}

impl Teacher {
    pub fn new(id: TeacherId, name: impl Into<String>) -> Self {
        let name = name.into();
        let human_key = HumanKey::from_name(&name);
        Self {
            id,
            name,
            human_key,
        }
    }

    pub fn human_key(&self) -> &HumanKey {
        &self.human_key
    }
}
