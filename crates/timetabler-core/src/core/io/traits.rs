use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Common interface of the timetable file formats.
///
/// Implementors only provide stream-based reading and writing; path-based
/// variants are derived.
pub trait TimetableFile {
    /// The in-memory value a file of this format holds.
    type Content;

    /// The error type for I/O and format errors.
    type Error: Error + From<io::Error>;

    /// Parses the content from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the data is malformed.
    fn read_from(reader: &mut impl BufRead) -> Result<Self::Content, Self::Error>;

    /// Serializes the content to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    fn write_to(content: &Self::Content, writer: &mut impl Write) -> Result<(), Self::Error>;

    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Content, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    fn write_to_path<P: AsRef<Path>>(content: &Self::Content, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(content, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
