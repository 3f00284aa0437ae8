use crate::core::io::traits::TimetableFile;
use crate::core::models::calendar::Day;
use crate::core::models::ids::{SectionId, SubjectId, TeacherId};
use crate::core::models::schedule::{Schedule, ScheduleKey, ScheduledLesson};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed schedule file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize schedule: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Slot ({day}, period {period}, section {section}) appears more than once")]
    DuplicateSlot {
        day: Day,
        period: u32,
        section: SectionId,
    },
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct ScheduleRecords {
    #[serde(default)]
    entries: Vec<EntryRecord>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct EntryRecord {
    day: Day,
    period: u32,
    section: SectionId,
    subject: SubjectId,
    teacher: TeacherId,
}

/// TOML representation of a generated [`Schedule`], one `[[entries]]` table per lesson
/// in (day, period, section) order.
pub struct ScheduleFile;

impl TimetableFile for ScheduleFile {
    type Content = Schedule;
    type Error = ScheduleFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<Schedule, ScheduleFileError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let records: ScheduleRecords = toml::from_str(&content)?;

        let mut schedule = Schedule::new();
        for entry in records.entries {
            let key = ScheduleKey::new(entry.day, entry.period, entry.section);
            let lesson = ScheduledLesson {
                subject: entry.subject,
                teacher: entry.teacher,
            };
            if schedule.insert(key, lesson).is_some() {
                return Err(ScheduleFileError::DuplicateSlot {
                    day: entry.day,
                    period: entry.period,
                    section: entry.section,
                });
            }
        }
        Ok(schedule)
    }

    fn write_to(schedule: &Schedule, writer: &mut impl Write) -> Result<(), ScheduleFileError> {
        let records = ScheduleRecords {
            entries: schedule
                .iter()
                .map(|(key, lesson)| EntryRecord {
                    day: key.day,
                    period: key.period,
                    section: key.section,
                    subject: lesson.subject,
                    teacher: lesson.teacher,
                })
                .collect(),
        };
        writer.write_all(toml::to_string(&records)?.as_bytes())?;
        Ok(())
    }
}
