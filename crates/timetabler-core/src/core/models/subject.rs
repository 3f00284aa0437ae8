use super::ids::SubjectId;

pub const DEFAULT_SUBJECT_COLOR: &str = "#E0E0E0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    /// Presentation hint only; the engine never reads it.
    pub color: String,
}

impl Subject {
    pub fn new(id: SubjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: DEFAULT_SUBJECT_COLOR.to_string(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}
