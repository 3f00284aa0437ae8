use super::ids::{SectionId, SubjectId, TeacherId};

/// Binds the teacher who delivers a subject to one class section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeacherAssignment {
    pub section: SectionId,
    pub subject: SubjectId,
    pub teacher: TeacherId,
}

impl TeacherAssignment {
    pub fn new(section: SectionId, subject: SubjectId, teacher: TeacherId) -> Self {
        Self {
            section,
            subject,
            teacher,
        }
    }
}

/// Number of lessons of a subject a section must receive each week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubjectRequirement {
    pub section: SectionId,
    pub subject: SubjectId,
    pub periods_per_week: u32,
}

impl SubjectRequirement {
    pub fn new(section: SectionId, subject: SubjectId, periods_per_week: u32) -> Self {
        Self {
            section,
            subject,
            periods_per_week,
        }
    }
}
