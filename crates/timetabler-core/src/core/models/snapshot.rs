use super::calendar::WeekGrid;
use super::concurrent::ConcurrentSet;
use super::ids::{SectionId, SetId, SubjectId, TeacherId};
use super::requirement::{SubjectRequirement, TeacherAssignment};
use super::section::{ClassSection, MAX_PERIODS_PER_DAY};
use super::subject::Subject;
use super::teacher::{HumanKey, Teacher};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SnapshotError {
    #[error("Duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },

    #[error("{context} references unknown {kind} id {id}")]
    UnknownReference {
        context: String,
        kind: &'static str,
        id: u32,
    },

    #[error(
        "Section {section} already has teacher {existing} assigned to subject {subject}; cannot also assign teacher {duplicate}"
    )]
    DuplicateAssignment {
        section: SectionId,
        subject: SubjectId,
        existing: TeacherId,
        duplicate: TeacherId,
    },

    #[error("Section {section} lists more than one weekly requirement for subject {subject}")]
    DuplicateRequirement {
        section: SectionId,
        subject: SubjectId,
    },

    #[error(
        "Section {section} declares {periods_per_day} periods per day; at most {MAX_PERIODS_PER_DAY} are supported"
    )]
    PeriodsPerDayOutOfRange {
        section: SectionId,
        periods_per_day: u32,
    },
}

/// An immutable, internally consistent view of every entity the engine reads.
///
/// A snapshot is taken once per run and never re-read. Construction through
/// [`SnapshotBuilder`] guarantees unique ids, resolvable references, at most one
/// assignment and at most one requirement per (section, subject) pair.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    teachers: Vec<Teacher>,
    subjects: Vec<Subject>,
    sections: Vec<ClassSection>,
    assignments: Vec<TeacherAssignment>,
    requirements: Vec<SubjectRequirement>,
    concurrent_sets: Vec<ConcurrentSet>,
    teacher_index: HashMap<TeacherId, usize>,
    subject_index: HashMap<SubjectId, usize>,
    section_index: HashMap<SectionId, usize>,
    assignment_map: HashMap<(SectionId, SubjectId), TeacherId>,
}

impl Snapshot {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn sections(&self) -> &[ClassSection] {
        &self.sections
    }

    pub fn assignments(&self) -> &[TeacherAssignment] {
        &self.assignments
    }

    pub fn requirements(&self) -> &[SubjectRequirement] {
        &self.requirements
    }

    pub fn concurrent_sets(&self) -> &[ConcurrentSet] {
        &self.concurrent_sets
    }

    pub fn teacher(&self, id: TeacherId) -> Option<&Teacher> {
        self.teacher_index.get(&id).map(|&i| &self.teachers[i])
    }

    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subject_index.get(&id).map(|&i| &self.subjects[i])
    }

    pub fn section(&self, id: SectionId) -> Option<&ClassSection> {
        self.section_index.get(&id).map(|&i| &self.sections[i])
    }

    /// Teacher assigned to deliver `subject` in `section`, if any.
    pub fn assigned_teacher(&self, section: SectionId, subject: SubjectId) -> Option<&Teacher> {
        self.assignment_map
            .get(&(section, subject))
            .and_then(|&teacher| self.teacher(teacher))
    }

    pub fn human_key_of(&self, teacher: TeacherId) -> Option<&HumanKey> {
        self.teacher(teacher).map(Teacher::human_key)
    }

    /// Longest school day across all sections, zero for an empty snapshot.
    pub fn max_periods_per_day(&self) -> u32 {
        self.sections
            .iter()
            .map(|s| s.periods_per_day)
            .max()
            .unwrap_or(0)
    }

    pub fn week_grid(&self) -> WeekGrid {
        WeekGrid::new(self.max_periods_per_day())
    }

    /// Sets whose section and subject lists both contain the given pair.
    pub fn sets_containing(
        &self,
        section: SectionId,
        subject: SubjectId,
    ) -> impl Iterator<Item = &ConcurrentSet> {
        self.concurrent_sets
            .iter()
            .filter(move |set| set.contains(section, subject))
    }
}

#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    teachers: Vec<Teacher>,
    subjects: Vec<Subject>,
    sections: Vec<ClassSection>,
    assignments: Vec<TeacherAssignment>,
    requirements: Vec<SubjectRequirement>,
    concurrent_sets: Vec<ConcurrentSet>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.push(teacher);
        self
    }
    pub fn subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }
    pub fn section(mut self, section: ClassSection) -> Self {
        self.sections.push(section);
        self
    }
    pub fn assignment(mut self, assignment: TeacherAssignment) -> Self {
        self.assignments.push(assignment);
        self
    }
    pub fn requirement(mut self, requirement: SubjectRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }
    pub fn concurrent_set(mut self, set: ConcurrentSet) -> Self {
        self.concurrent_sets.push(set);
        self
    }

    pub fn build(self) -> Result<Snapshot, SnapshotError> {
        let teacher_index = index_unique(&self.teachers, "teacher", |t| t.id.0)?;
        let subject_index = index_unique(&self.subjects, "subject", |s| s.id.0)?;
        let section_index = index_unique(&self.sections, "section", |s| s.id.0)?;
        index_unique(&self.concurrent_sets, "concurrent set", |s| s.id.0)?;

        let teacher_index: HashMap<TeacherId, usize> = teacher_index
            .into_iter()
            .map(|(id, i)| (TeacherId(id), i))
            .collect();
        let subject_index: HashMap<SubjectId, usize> = subject_index
            .into_iter()
            .map(|(id, i)| (SubjectId(id), i))
            .collect();
        let section_index: HashMap<SectionId, usize> = section_index
            .into_iter()
            .map(|(id, i)| (SectionId(id), i))
            .collect();

        let check_section = |context: &dyn Fn() -> String, id: SectionId| {
            if section_index.contains_key(&id) {
                Ok(())
            } else {
                Err(SnapshotError::UnknownReference {
                    context: context(),
                    kind: "section",
                    id: id.0,
                })
            }
        };
        let check_subject = |context: &dyn Fn() -> String, id: SubjectId| {
            if subject_index.contains_key(&id) {
                Ok(())
            } else {
                Err(SnapshotError::UnknownReference {
                    context: context(),
                    kind: "subject",
                    id: id.0,
                })
            }
        };
        let check_teacher = |context: &dyn Fn() -> String, id: TeacherId| {
            if teacher_index.contains_key(&id) {
                Ok(())
            } else {
                Err(SnapshotError::UnknownReference {
                    context: context(),
                    kind: "teacher",
                    id: id.0,
                })
            }
        };

        for section in &self.sections {
            if section.periods_per_day > MAX_PERIODS_PER_DAY {
                return Err(SnapshotError::PeriodsPerDayOutOfRange {
                    section: section.id,
                    periods_per_day: section.periods_per_day,
                });
            }
            if let Some(teacher) = section.class_teacher {
                check_teacher(&|| format!("Class teacher of section {}", section.id), teacher)?;
            }
        }

        let mut assignment_map = HashMap::with_capacity(self.assignments.len());
        for a in &self.assignments {
            let context = || format!("Assignment ({}, {})", a.section, a.subject);
            check_section(&context, a.section)?;
            check_subject(&context, a.subject)?;
            check_teacher(&context, a.teacher)?;
            if let Some(&existing) = assignment_map.get(&(a.section, a.subject)) {
                return Err(SnapshotError::DuplicateAssignment {
                    section: a.section,
                    subject: a.subject,
                    existing,
                    duplicate: a.teacher,
                });
            }
            assignment_map.insert((a.section, a.subject), a.teacher);
        }

        let mut seen_requirements = HashSet::with_capacity(self.requirements.len());
        for r in &self.requirements {
            let context = || format!("Requirement ({}, {})", r.section, r.subject);
            check_section(&context, r.section)?;
            check_subject(&context, r.subject)?;
            if !seen_requirements.insert((r.section, r.subject)) {
                return Err(SnapshotError::DuplicateRequirement {
                    section: r.section,
                    subject: r.subject,
                });
            }
        }

        for set in &self.concurrent_sets {
            let context = || format!("Concurrent set '{}'", set.name);
            for &section in &set.sections {
                check_section(&context, section)?;
            }
            for &subject in &set.subjects {
                check_subject(&context, subject)?;
            }
        }

        Ok(Snapshot {
            teachers: self.teachers,
            subjects: self.subjects,
            sections: self.sections,
            assignments: self.assignments,
            requirements: self.requirements,
            concurrent_sets: self.concurrent_sets,
            teacher_index,
            subject_index,
            section_index,
            assignment_map,
        })
    }
}

fn index_unique<T>(
    items: &[T],
    kind: &'static str,
    id_of: impl Fn(&T) -> u32,
) -> Result<HashMap<u32, usize>, SnapshotError> {
    let mut index = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let id = id_of(item);
        if index.insert(id, i).is_some() {
            return Err(SnapshotError::DuplicateId { kind, id });
        }
    }
    Ok(index)
}
