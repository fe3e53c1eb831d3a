// LanceDB vector database module
// One table per content index, documents stored as JSON next to their vector


pub mod vector_store;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row stored in a LanceDB index table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique identifier for this row
    pub id: String,
    /// Embedding of the document text
    pub vector: Vec<f32>,
    /// Exact-match key, e.g. a reflection's `MM-DD`
    pub lookup_key: Option<String>,
    /// Source-specific fields (page number, title, quote, ...)
    pub document: serde_json::Value,
}

impl DocumentRecord {
    #[inline]
    pub fn new(vector: Vec<f32>, document: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            vector,
            lookup_key: None,
            document,
        }
    }

    #[inline]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[inline]
    pub fn with_lookup_key(mut self, key: impl Into<String>) -> Self {
        self.lookup_key = Some(key.into());
        self
    }
}
