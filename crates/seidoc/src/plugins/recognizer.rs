//! Named-entity recognizer plugin trait.

use crate::Result;
use crate::plugins::Plugin;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLabel {
    Person,
    Organization,
    Email,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    pub label: EntityLabel,
    pub text: String,
    /// Byte offset of the entity in the analysed text.
    pub start: usize,
}

impl RecognizedEntity {
    pub fn new(label: EntityLabel, text: impl Into<String>, start: usize) -> Self {
        Self {
            label,
            text: text.into(),
            start,
        }
    }

    pub fn is_name(&self) -> bool {
        matches!(self.label, EntityLabel::Person | EntityLabel::Organization)
    }
}

/// Tags spans of text with entity labels.
///
/// Implementations are shared read-only across concurrent extractions and
/// may be slow (model inference); callers run them off the async executor.
pub trait EntityRecognizer: Plugin {
    /// Entities in the text. Order does not matter; callers sort by `start`.
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>>;
}
