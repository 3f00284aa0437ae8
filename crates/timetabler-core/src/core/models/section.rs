use super::calendar::DAYS_PER_WEEK;
use super::ids::{SectionId, TeacherId};

/// Longest school day a section may declare.
pub const MAX_PERIODS_PER_DAY: u32 = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSection {
    pub id: SectionId,
    pub name: String,
    /// Name shown to users when several sections are merged into one timetable.
    pub display_name: Option<String>,
    pub periods_per_day: u32,
    /// Informational only; not a scheduling constraint.
    pub class_teacher: Option<TeacherId>,
}

impl ClassSection {
    pub fn new(id: SectionId, name: impl Into<String>, periods_per_day: u32) -> Self {
        Self {
            id,
            name: name.into(),
            display_name: None,
            periods_per_day,
            class_teacher: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_class_teacher(mut self, teacher: TeacherId) -> Self {
        self.class_teacher = Some(teacher);
        self
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Total number of lessons this section can hold in one week.
    pub fn weekly_capacity(&self) -> u64 {
        u64::from(self.periods_per_day) * DAYS_PER_WEEK as u64
    }

    /// Senior sections are recognized by their daily period count.
    pub fn is_senior(&self, senior_periods_per_day: u32) -> bool {
        self.periods_per_day == senior_periods_per_day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_capacity_spans_all_instructional_days() {
        let section = ClassSection::new(SectionId(1), "10-A", 8);
        assert_eq!(section.weekly_capacity(), 40);
    }

    #[test]
    fn label_prefers_display_name() {
        let plain = ClassSection::new(SectionId(1), "11-SCI-B", 6);
        assert_eq!(plain.label(), "11-SCI-B");
        let merged = plain.with_display_name("11-B");
        assert_eq!(merged.label(), "11-B");
    }

    #[test]
    fn seniority_follows_periods_per_day_marker() {
        assert!(ClassSection::new(SectionId(1), "12-A", 6).is_senior(6));
        assert!(!ClassSection::new(SectionId(2), "9-A", 8).is_senior(6));
    }
}
