use serde::{Deserialize, Serialize};
use std::fmt;

pub const DAYS_PER_WEEK: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Day {
    pub const ALL: [Day; DAYS_PER_WEEK] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The shared weekly time axis every section is placed on.
///
/// Position `t` stands for day `t / periods_per_day` and zero-based period
/// `t % periods_per_day`, where `periods_per_day` is the longest school day in
/// the snapshot. A section with fewer periods simply cannot use the trailing
/// positions of each day, so a position denotes the same real period for every
/// section and every teacher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekGrid {
    periods_per_day: u32,
}

impl WeekGrid {
    pub fn new(periods_per_day: u32) -> Self {
        Self { periods_per_day }
    }

    pub fn periods_per_day(&self) -> u32 {
        self.periods_per_day
    }

    /// Number of positions on the axis.
    pub fn horizon(&self) -> i64 {
        i64::from(self.periods_per_day) * DAYS_PER_WEEK as i64
    }

    pub fn slot(&self, day: Day, period_index: u32) -> i64 {
        day.index() as i64 * i64::from(self.periods_per_day) + i64::from(period_index)
    }

    /// Positions usable by a section teaching `section_periods_per_day` periods a day.
    pub fn section_slots(&self, section_periods_per_day: u32) -> Vec<i64> {
        let usable = section_periods_per_day.min(self.periods_per_day);
        Day::ALL
            .iter()
            .flat_map(|&day| (0..usable).map(move |p| self.slot(day, p)))
            .collect()
    }

    /// Inclusive bounds of a day on the axis.
    pub fn day_bounds(&self, day: Day) -> (i64, i64) {
        let first = self.slot(day, 0);
        (first, first + i64::from(self.periods_per_day) - 1)
    }

    /// Splits a position into its day and 1-based period number.
    pub fn decompose(&self, slot: i64) -> Option<(Day, u32)> {
        if self.periods_per_day == 0 || slot < 0 || slot >= self.horizon() {
            return None;
        }
        let per_day = i64::from(self.periods_per_day);
        let day = Day::from_index((slot / per_day) as usize)?;
        Some((day, (slot % per_day) as u32 + 1))
    }
}
