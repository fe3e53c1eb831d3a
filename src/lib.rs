//! # recovery-rag
//!
//! Retrieval-augmented search over two content collections, the AA Big Book
//! (page chunks) and the Daily Reflections, plus the citation and prompt
//! layers that turn ranked passages into a grounded LLM context.
//!
//! ```text
//! query ──► Embedder ──► vector ─┬─► Big Book source ───┐
//!                                └─► Reflections source ─┴─► fuse ─┬─► citations
//!                                                                  └─► prompt
//! ```

use thiserror::Error;

use crate::embeddings::EmbeddingError;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod chat;
pub mod citations;
pub mod commands;
pub mod config;
pub mod database;
pub mod dates;
pub mod embeddings;
pub mod prompt;
pub mod search;
