use serde::{Deserialize, Serialize};

/// A bounded-length text segment, the atomic unit of retrieval. Immutable
/// once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source_hint: Option<String>,
}

impl Chunk {
    pub fn new(text: impl Into<String>, source_hint: Option<String>) -> Self {
        Self {
            text: text.into(),
            source_hint,
        }
    }
}
