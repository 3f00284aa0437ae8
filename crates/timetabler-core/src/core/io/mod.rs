//! Reading and writing the timetable file formats.
//!
//! The engine itself never touches the file system. These formats exist for
//! callers that load a snapshot from disk or persist an accepted schedule, and
//! share the [`traits::TimetableFile`] interface.

pub mod schedule_file;
pub mod snapshot_file;
pub mod traits;
