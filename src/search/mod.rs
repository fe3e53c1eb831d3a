//! Multi-source retrieval.
//!
//! Each collection has its own searcher ([`sources`]) that turns raw ANN
//! candidates into [`SearchResult`]s. [`combined`] embeds the query once, runs
//! every source concurrently and hands the lists to [`fusion`] for the final
//! ranking.

#[cfg(test)]
pub(crate) mod fakes;
#[cfg(test)]
mod tests;

pub mod combined;
pub mod documents;
pub mod fusion;
pub mod sources;

use serde::Serialize;
use std::fmt;

use crate::dates::DateKey;

pub use combined::{CombinedSearch, CombinedSearchOutcome, SourceHealth, SourceStatus};
pub use documents::{BigBookDocument, ReflectionDocument, SourceDocument};
pub use fusion::{dedupe_by_page, fuse};
pub use sources::SourceSearcher;

/// Which collection a result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceLabel {
    #[serde(rename = "Big Book")]
    BigBook,
    #[serde(rename = "Daily Reflection")]
    DailyReflection,
}

impl SourceLabel {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BigBook => "Big Book",
            Self::DailyReflection => "Daily Reflection",
        }
    }
}

impl fmt::Display for SourceLabel {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a result lives in its collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    Page(u32),
    Date(DateKey),
}

/// A scored passage from one source, in the shape shared by all sources
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub text: String,
    pub score: f32,
    pub source: SourceLabel,
    pub reference: String,
    pub locator: Option<Locator>,
    pub url: Option<String>,
    pub chunk_id: Option<String>,
    pub chapter_title: Option<String>,
}

impl SearchResult {
    #[inline]
    pub fn page_number(&self) -> Option<u32> {
        match self.locator {
            Some(Locator::Page(page)) => Some(page),
            _ => None,
        }
    }

    #[inline]
    pub fn date_key(&self) -> Option<DateKey> {
        match self.locator {
            Some(Locator::Date(key)) => Some(key),
            _ => None,
        }
    }
}

/// Result count and score floor for one search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    pub limit: usize,
    pub min_score: f32,
}

impl SearchOptions {
    #[inline]
    pub fn new(limit: usize, min_score: f32) -> Self {
        Self { limit, min_score }
    }

    /// Candidate pool requested from the ANN engine
    #[inline]
    pub fn num_candidates(&self) -> usize {
        self.limit.saturating_mul(10).max(100)
    }
}

/// Input to a combined search
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Text(String),
    /// A vector already in the content embedding space
    Embedding(Vec<f32>),
}

impl From<&str> for Query {
    #[inline]
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Query {
    #[inline]
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<f32>> for Query {
    #[inline]
    fn from(vector: Vec<f32>) -> Self {
        Self::Embedding(vector)
    }
}

