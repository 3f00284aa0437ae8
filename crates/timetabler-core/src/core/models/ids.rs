use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub u32);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<u32> for $name {
                fn from(raw: u32) -> Self {
                    Self(raw)
                }
            }
        )*
    };
}

entity_id! {
    /// Identity of a [`Teacher`](super::teacher::Teacher) record.
    TeacherId,
    /// Identity of a [`Subject`](super::subject::Subject).
    SubjectId,
    /// Identity of a [`ClassSection`](super::section::ClassSection).
    SectionId,
    /// Identity of a [`ConcurrentSet`](super::concurrent::ConcurrentSet).
    SetId,
}
