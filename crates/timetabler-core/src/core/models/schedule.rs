use super::calendar::Day;
use super::ids::{SectionId, SetId, SubjectId, TeacherId};
use super::snapshot::Snapshot;
use super::teacher::HumanKey;
use itertools::Itertools;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use thiserror::Error;

/// Position of one lesson in the week: day, 1-based period, and the section taught.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScheduleKey {
    pub day: Day,
    pub period: u32,
    pub section: SectionId,
}

impl ScheduleKey {
    pub fn new(day: Day, period: u32, section: SectionId) -> Self {
        Self {
            day,
            period,
            section,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduledLesson {
    pub subject: SubjectId,
    pub teacher: TeacherId,
}

/// A problem found while checking a schedule against the snapshot it was built from.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleViolation {
    #[error("Section {section} has a lesson on {day} period {period}, outside its school day")]
    OutsideSchoolDay {
        section: SectionId,
        day: Day,
        period: u32,
    },

    #[error("Section {section} has no assignment of teacher {teacher} to subject {subject}")]
    UnassignedTeacher {
        section: SectionId,
        subject: SubjectId,
        teacher: TeacherId,
    },

    #[error(
        "Section {section} has lessons of subject {subject} outside the slots shared by concurrent set {set}"
    )]
    SetOutOfStep {
        set: SetId,
        section: SectionId,
        subject: SubjectId,
    },

    #[error("{human} teaches {} lessons on {day} period {period} that are not synchronized", .lessons.len())]
    HumanDoubleBooked {
        human: HumanKey,
        day: Day,
        period: u32,
        lessons: Vec<(SectionId, SubjectId)>,
    },

    #[error("Section {section} has {scheduled} lessons of subject {subject}, expected {required}")]
    WrongLessonCount {
        section: SectionId,
        subject: SubjectId,
        scheduled: u32,
        required: u32,
    },

    #[error("Section {section} has {count} lessons of subject {subject} on {day}, limit is {limit}")]
    DailyLimitExceeded {
        section: SectionId,
        subject: SubjectId,
        day: Day,
        count: u32,
        limit: u32,
    },
}

/// A complete weekly timetable.
///
/// Keys are unique per (day, period, section), so a section can never hold two
/// lessons in one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    entries: BTreeMap<ScheduleKey, ScheduledLesson>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a lesson, returning the lesson previously held by the slot, if any.
    pub fn insert(&mut self, key: ScheduleKey, lesson: ScheduledLesson) -> Option<ScheduledLesson> {
        self.entries.insert(key, lesson)
    }

    pub fn get(&self, key: &ScheduleKey) -> Option<&ScheduledLesson> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lessons ordered by day, period and section.
    pub fn iter(&self) -> impl Iterator<Item = (&ScheduleKey, &ScheduledLesson)> {
        self.entries.iter()
    }

    pub fn for_section(
        &self,
        section: SectionId,
    ) -> impl Iterator<Item = (&ScheduleKey, &ScheduledLesson)> {
        self.entries.iter().filter(move |(k, _)| k.section == section)
    }

    /// Every lesson taught by any teacher record belonging to `human`.
    pub fn for_human<'a>(
        &'a self,
        snapshot: &'a Snapshot,
        human: &'a HumanKey,
    ) -> impl Iterator<Item = (&'a ScheduleKey, &'a ScheduledLesson)> {
        self.entries
            .iter()
            .filter(move |(_, lesson)| snapshot.human_key_of(lesson.teacher) == Some(human))
    }

    pub fn lesson_count(&self, section: SectionId, subject: SubjectId) -> usize {
        self.for_section(section)
            .filter(|(_, lesson)| lesson.subject == subject)
            .count()
    }

    /// Checks every timetable invariant and returns all violations found.
    pub fn verify(&self, snapshot: &Snapshot, max_lessons_per_day: u32) -> Vec<ScheduleViolation> {
        let mut violations = Vec::new();

        for (key, lesson) in &self.entries {
            let within_day = snapshot
                .section(key.section)
                .is_some_and(|s| key.period >= 1 && key.period <= s.periods_per_day);
            if !within_day {
                violations.push(ScheduleViolation::OutsideSchoolDay {
                    section: key.section,
                    day: key.day,
                    period: key.period,
                });
            }
            let assigned = snapshot
                .assigned_teacher(key.section, lesson.subject)
                .map(|t| t.id);
            if assigned != Some(lesson.teacher) {
                violations.push(ScheduleViolation::UnassignedTeacher {
                    section: key.section,
                    subject: lesson.subject,
                    teacher: lesson.teacher,
                });
            }
        }

        let out_of_step = self.verify_set_alignment(snapshot, &mut violations);
        self.verify_human_overlaps(snapshot, &out_of_step, &mut violations);
        self.verify_lesson_counts(snapshot, &mut violations);
        self.verify_daily_limits(max_lessons_per_day, &mut violations);

        violations
    }

    /// Every occurrence group of a set shares one slot, so the members' slot sets
    /// form a chain: ordered by size, each lies within the one before. Returns
    /// the sets breaking that chain.
    fn verify_set_alignment(
        &self,
        snapshot: &Snapshot,
        violations: &mut Vec<ScheduleViolation>,
    ) -> HashSet<SetId> {
        let mut out_of_step = HashSet::new();
        for set in snapshot.concurrent_sets() {
            let mut members: Vec<((SectionId, SubjectId), BTreeSet<(Day, u32)>)> = set
                .sections
                .iter()
                .cartesian_product(&set.subjects)
                .map(|(&section, &subject)| {
                    let slots: BTreeSet<_> = self
                        .for_section(section)
                        .filter(|(_, lesson)| lesson.subject == subject)
                        .map(|(key, _)| (key.day, key.period))
                        .collect();
                    ((section, subject), slots)
                })
                .filter(|(_, slots)| !slots.is_empty())
                .collect();
            members.sort_by_key(|(_, slots)| Reverse(slots.len()));

            for pair in members.windows(2) {
                let ((section, subject), slots) = &pair[1];
                if !slots.is_subset(&pair[0].1) {
                    violations.push(ScheduleViolation::SetOutOfStep {
                        set: set.id,
                        section: *section,
                        subject: *subject,
                    });
                    out_of_step.insert(set.id);
                }
            }
        }
        out_of_step
    }

    /// Lessons of one person may only share a slot when they are one occurrence
    /// group of a set that stays in step.
    fn verify_human_overlaps(
        &self,
        snapshot: &Snapshot,
        out_of_step: &HashSet<SetId>,
        violations: &mut Vec<ScheduleViolation>,
    ) {
        let mut by_human_slot: BTreeMap<(&HumanKey, Day, u32), Vec<(SectionId, SubjectId)>> =
            BTreeMap::new();
        for (key, lesson) in &self.entries {
            if let Some(human) = snapshot.human_key_of(lesson.teacher) {
                by_human_slot
                    .entry((human, key.day, key.period))
                    .or_default()
                    .push((key.section, lesson.subject));
            }
        }

        for ((human, day, period), lessons) in by_human_slot {
            if lessons.len() < 2 {
                continue;
            }
            let synchronized = snapshot.concurrent_sets().iter().any(|set| {
                !out_of_step.contains(&set.id)
                    && lessons
                        .iter()
                        .all(|&(section, subject)| set.contains(section, subject))
            });
            if !synchronized {
                violations.push(ScheduleViolation::HumanDoubleBooked {
                    human: human.clone(),
                    day,
                    period,
                    lessons,
                });
            }
        }
    }

    fn verify_lesson_counts(&self, snapshot: &Snapshot, violations: &mut Vec<ScheduleViolation>) {
        let counts: HashMap<(SectionId, SubjectId), usize> = self
            .entries
            .iter()
            .map(|(key, lesson)| (key.section, lesson.subject))
            .counts();

        for req in snapshot.requirements() {
            if snapshot.assigned_teacher(req.section, req.subject).is_none() {
                continue;
            }
            let scheduled = counts.get(&(req.section, req.subject)).copied().unwrap_or(0) as u32;
            if scheduled != req.periods_per_week {
                violations.push(ScheduleViolation::WrongLessonCount {
                    section: req.section,
                    subject: req.subject,
                    scheduled,
                    required: req.periods_per_week,
                });
            }
        }
    }

    fn verify_daily_limits(&self, limit: u32, violations: &mut Vec<ScheduleViolation>) {
        let per_day = self
            .entries
            .iter()
            .map(|(key, lesson)| (key.section, lesson.subject, key.day))
            .counts();

        for ((section, subject, day), count) in per_day.into_iter().sorted() {
            let count = count as u32;
            if count > limit {
                violations.push(ScheduleViolation::DailyLimitExceeded {
                    section,
                    subject,
                    day,
                    count,
                    limit,
                });
            }
        }
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = (&'a ScheduleKey, &'a ScheduledLesson);
    type IntoIter = std::collections::btree_map::Iter<'a, ScheduleKey, ScheduledLesson>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
