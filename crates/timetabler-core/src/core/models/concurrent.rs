use super::ids::{SectionId, SetId, SubjectId};
use std::collections::BTreeSet;

/// Section and subject combinations that are taught in the same period.
///
/// Electives split across sections are the typical use: every member
/// (section, subject) pair with a lesson in the set meets simultaneously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcurrentSet {
    pub id: SetId,
    pub name: String,
    pub sections: BTreeSet<SectionId>,
    pub subjects: BTreeSet<SubjectId>,
}

impl ConcurrentSet {
    pub fn new(id: SetId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sections: BTreeSet::new(),
            subjects: BTreeSet::new(),
        }
    }

    pub fn with_sections(mut self, sections: impl IntoIterator<Item = SectionId>) -> Self {
        self.sections.extend(sections);
        self
    }

    pub fn with_subjects(mut self, subjects: impl IntoIterator<Item = SubjectId>) -> Self {
        self.subjects.extend(subjects);
        self
    }

    pub fn contains(&self, section: SectionId, subject: SubjectId) -> bool {
        self.sections.contains(&section) && self.subjects.contains(&subject)
    }
}
