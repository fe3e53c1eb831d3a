// Embeddings module
// Query-time text embedding behind a small async trait

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

pub use openai::OpenAiClient;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding request failed: {0}")]
    Request(String),
    #[error("Embedding service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse embedding response: {0}")]
    Parse(String),
    #[error("Embedding service returned no vectors")]
    EmptyResponse,
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("No API key configured (set openai.api_key or OPENAI_API_KEY)")]
    MissingApiKey,
    #[error("Embedding task failed: {0}")]
    Task(String),
}

/// Maps text to a fixed-dimension vector in the same space as the stored content
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Length of every vector this embedder returns
    fn dimension(&self) -> usize;
}
