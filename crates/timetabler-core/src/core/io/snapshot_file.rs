use crate::core::io::traits::TimetableFile;
use crate::core::models::concurrent::ConcurrentSet;
use crate::core::models::ids::{SectionId, SetId, SubjectId, TeacherId};
use crate::core::models::requirement::{SubjectRequirement, TeacherAssignment};
use crate::core::models::section::ClassSection;
use crate::core::models::snapshot::{Snapshot, SnapshotError};
use crate::core::models::subject::{DEFAULT_SUBJECT_COLOR, Subject};
use crate::core::models::teacher::Teacher;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed snapshot file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Inconsistent snapshot: {0}")]
    Invalid(#[from] SnapshotError),
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct SnapshotRecords {
    #[serde(default)]
    teachers: Vec<TeacherRecord>,
    #[serde(default)]
    subjects: Vec<SubjectRecord>,
    #[serde(default)]
    sections: Vec<SectionRecord>,
    #[serde(default)]
    assignments: Vec<AssignmentRecord>,
    #[serde(default)]
    requirements: Vec<RequirementRecord>,
    #[serde(default)]
    concurrent_sets: Vec<ConcurrentSetRecord>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct TeacherRecord {
    id: TeacherId,
    name: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct SubjectRecord {
    id: SubjectId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct SectionRecord {
    id: SectionId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    periods_per_day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class_teacher: Option<TeacherId>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct AssignmentRecord {
    section: SectionId,
    subject: SubjectId,
    teacher: TeacherId,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RequirementRecord {
    section: SectionId,
    subject: SubjectId,
    periods_per_week: u32,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct ConcurrentSetRecord {
    id: SetId,
    name: String,
    #[serde(default)]
    sections: Vec<SectionId>,
    #[serde(default)]
    subjects: Vec<SubjectId>,
}

impl SnapshotRecords {
    fn into_snapshot(self) -> Result<Snapshot, SnapshotError> {
        let mut builder = Snapshot::builder();
        for t in self.teachers {
            builder = builder.teacher(Teacher::new(t.id, t.name));
        }
        for s in self.subjects {
            let subject = Subject::new(s.id, s.name);
            builder = builder.subject(match s.color {
                Some(color) => subject.with_color(color),
                None => subject,
            });
        }
        for s in self.sections {
            let mut section = ClassSection::new(s.id, s.name, s.periods_per_day);
            section.display_name = s.display_name;
            section.class_teacher = s.class_teacher;
            builder = builder.section(section);
        }
        for a in self.assignments {
            builder = builder.assignment(TeacherAssignment::new(a.section, a.subject, a.teacher));
        }
        for r in self.requirements {
            builder = builder.requirement(SubjectRequirement::new(
                r.section,
                r.subject,
                r.periods_per_week,
            ));
        }
        for c in self.concurrent_sets {
            builder = builder.concurrent_set(
                ConcurrentSet::new(c.id, c.name)
                    .with_sections(c.sections)
                    .with_subjects(c.subjects),
            );
        }
        builder.build()
    }

    fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            teachers: snapshot
                .teachers()
                .iter()
                .map(|t| TeacherRecord {
                    id: t.id,
                    name: t.name.clone(),
                })
                .collect(),
            subjects: snapshot
                .subjects()
                .iter()
                .map(|s| SubjectRecord {
                    id: s.id,
                    name: s.name.clone(),
                    color: (s.color != DEFAULT_SUBJECT_COLOR).then(|| s.color.clone()),
                })
                .collect(),
            sections: snapshot
                .sections()
                .iter()
                .map(|s| SectionRecord {
                    id: s.id,
                    name: s.name.clone(),
                    display_name: s.display_name.clone(),
                    periods_per_day: s.periods_per_day,
                    class_teacher: s.class_teacher,
                })
                .collect(),
            assignments: snapshot
                .assignments()
                .iter()
                .map(|a| AssignmentRecord {
                    section: a.section,
                    subject: a.subject,
                    teacher: a.teacher,
                })
                .collect(),
            requirements: snapshot
                .requirements()
                .iter()
                .map(|r| RequirementRecord {
                    section: r.section,
                    subject: r.subject,
                    periods_per_week: r.periods_per_week,
                })
                .collect(),
            concurrent_sets: snapshot
                .concurrent_sets()
                .iter()
                .map(|c| ConcurrentSetRecord {
                    id: c.id,
                    name: c.name.clone(),
                    sections: c.sections.iter().copied().collect(),
                    subjects: c.subjects.iter().copied().collect(),
                })
                .collect(),
        }
    }
}

/// TOML representation of a [`Snapshot`].
///
/// ```toml
/// [[teachers]]
/// id = 1
/// name = "Suman Sharma (2)"
///
/// [[sections]]
/// id = 10
/// name = "12-A"
/// periods-per-day = 6
///
/// [[concurrent-sets]]
/// id = 1
/// name = "Skill Electives"
/// sections = [10, 11]
/// subjects = [5, 6]
/// ```
pub struct SnapshotFile;

impl TimetableFile for SnapshotFile {
    type Content = Snapshot;
    type Error = SnapshotFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<Snapshot, SnapshotFileError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let records: SnapshotRecords = toml::from_str(&content)?;
        Ok(records.into_snapshot()?)
    }

    fn write_to(snapshot: &Snapshot, writer: &mut impl Write) -> Result<(), SnapshotFileError> {
        let content = toml::to_string(&SnapshotRecords::from_snapshot(snapshot))?;
        writer.write_all(content.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = r##"
[[teachers]]
id = 1
name = "Suman Sharma"

[[teachers]]
id = 2
name = "Suman Sharma (2)"

[[subjects]]
id = 10
name = "Physics"
color = "#AACCEE"

[[subjects]]
id = 11
name = "Music"

[[sections]]
id = 100
name = "12-SCI-A"
display-name = "12-A"
periods-per-day = 6
class-teacher = 1

[[sections]]
id = 101
name = "12-SCI-B"
periods-per-day = 6

[[assignments]]
section = 100
subject = 10
teacher = 1

[[assignments]]
section = 101
subject = 10
teacher = 2

[[requirements]]
section = 100
subject = 10
periods-per-week = 7

[[concurrent-sets]]
id = 1
name = "Physics Block"
sections = [100, 101]
subjects = [10]
"##;

    #[test]
    fn reads_a_complete_snapshot() {
        let snapshot = SnapshotFile::read_from(&mut Cursor::new(SAMPLE)).unwrap();

        assert_eq!(snapshot.teachers().len(), 2);
        assert_eq!(snapshot.subject(SubjectId(10)).unwrap().color, "#AACCEE");
        assert_eq!(snapshot.subject(SubjectId(11)).unwrap().color, DEFAULT_SUBJECT_COLOR);
        let section = snapshot.section(SectionId(100)).unwrap();
        assert_eq!(section.label(), "12-A");
        assert_eq!(section.class_teacher, Some(TeacherId(1)));
        assert_eq!(snapshot.requirements()[0].periods_per_week, 7);
        assert!(snapshot.concurrent_sets()[0].contains(SectionId(101), SubjectId(10)));
        assert_eq!(
            snapshot.human_key_of(TeacherId(2)).unwrap().as_str(),
            "Suman Sharma"
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        let input = "[[teachers]]\nid = 1\nname = \"A\"\nsalary = 3\n";
        let err = SnapshotFile::read_from(&mut Cursor::new(input)).unwrap_err();
        assert!(matches!(err, SnapshotFileError::Parse(_)));
    }

    #[test]
    fn surfaces_consistency_errors() {
        let input = "[[requirements]]\nsection = 1\nsubject = 2\nperiods-per-week = 3\n";
        let err = SnapshotFile::read_from(&mut Cursor::new(input)).unwrap_err();
        assert!(matches!(err, SnapshotFileError::Invalid(_)));
    }

    #[test]
    fn written_file_reads_back_identically() {
        let original = SnapshotFile::read_from(&mut Cursor::new(SAMPLE)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.toml");

        SnapshotFile::write_to_path(&original, &path).unwrap();
        let reread = SnapshotFile::read_from_path(&path).unwrap();

        assert_eq!(reread.teachers(), original.teachers());
        assert_eq!(reread.subjects(), original.subjects());
        assert_eq!(reread.sections(), original.sections());
        assert_eq!(reread.assignments(), original.assignments());
        assert_eq!(reread.requirements(), original.requirements());
        assert_eq!(reread.concurrent_sets(), original.concurrent_sets());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SnapshotFile::read_from_path(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, SnapshotFileError::Io(_)));
    }
}
