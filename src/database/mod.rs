// Database module
// The ANN search seam used by the per-source searchers, backed by LanceDB

pub mod lancedb;


use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use self::lancedb::DocumentRecord;
pub use self::lancedb::vector_store::LanceVectorStore;

/// One nearest-neighbour request against a named index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorQuery<'a> {
    pub index: &'a str,
    pub vector: &'a [f32],
    /// Candidate pool considered by the ANN engine before the top `limit` are kept
    pub num_candidates: usize,
    pub limit: usize,
}

/// A stored document plus the engine's similarity score, before any shaping
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    pub document: serde_json::Value,
    pub score: Option<f32>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Index '{index}' is unavailable: {message}")]
    IndexUnavailable { index: String, message: String },
    #[error("Search on index '{index}' failed: {message}")]
    Query { index: String, message: String },
    #[error("Search on index '{index}' timed out after {after:?}")]
    Timeout { index: String, after: Duration },
}

impl SourceError {
    #[inline]
    pub fn unavailable(index: &str, message: impl ToString) -> Self {
        Self::IndexUnavailable {
            index: index.to_string(),
            message: message.to_string(),
        }
    }

    #[inline]
    pub fn query(index: &str, message: impl ToString) -> Self {
        Self::Query {
            index: index.to_string(),
            message: message.to_string(),
        }
    }

    #[inline]
    pub fn index(&self) -> &str {
        match self {
            Self::IndexUnavailable { index, .. }
            | Self::Query { index, .. }
            | Self::Timeout { index, .. } => index,
        }
    }
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Cosine-similarity search returning at most `query.limit` candidates
    async fn vector_search(
        &self,
        query: &VectorQuery<'_>,
    ) -> Result<Vec<RawCandidate>, SourceError>;

    /// Exact lookup of a stored document by its lookup key
    async fn find_by_key(
        &self,
        index: &str,
        key: &str,
    ) -> Result<Option<DocumentRecord>, SourceError>;
}
