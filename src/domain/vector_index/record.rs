//! Records stored in and returned from a vector index

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata key holding the passage text
pub const CONTENT_METADATA_KEY: &str = "text";

/// A vector plus the passage it was computed from, as written at ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub content: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl IndexRecord {
    pub fn new(id: impl Into<String>, values: Vec<f32>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values,
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn dimensions(&self) -> usize {
        self.values.len()
    }
}

/// A passage returned by similarity search.
///
/// `score` is cosine similarity: higher means more similar, range [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub id: String,
    pub content: String,
    pub score: f32,
}

impl RetrievedPassage {
    pub fn new(id: impl Into<String>, content: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_record_metadata() {
        let record = IndexRecord::new("ebook_chunk_0", vec![0.1, 0.2], "Agentic AI is...")
            .with_metadata("source", serde_json::json!("ebook.pdf"));

        assert_eq!(record.dimensions(), 2);
        assert_eq!(
            record.metadata.get("source"),
            Some(&serde_json::json!("ebook.pdf"))
        );
    }
}
