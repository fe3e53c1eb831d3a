
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::documents::ReflectionDocument;
use super::fusion::fuse;
use super::sources::SourceSearcher;
use super::{Query, SearchOptions, SearchResult, SourceLabel};
use crate::config::SearchConfig;
use crate::database::{SourceError, VectorIndex};
use crate::dates::DateKey;
use crate::embeddings::Embedder;
use crate::{RagError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SourceHealth {
    Healthy,
    Degraded(String),
}

/// How one source fared during a combined search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub source: SourceLabel,
    pub index: String,
    pub health: SourceHealth,
    /// Results this source contributed before fusion
    pub result_count: usize,
}

impl SourceStatus {
    #[inline]
    pub fn is_healthy(&self) -> bool {
        self.health == SourceHealth::Healthy
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedSearchOutcome {
    pub results: Vec<SearchResult>,
    pub sources: Vec<SourceStatus>,
}

/// Embeds a query once and searches every source with the same vector
pub struct CombinedSearch {
    embedder: Arc<dyn Embedder>,
    big_book: SourceSearcher,
    reflections: SourceSearcher,
}

impl CombinedSearch {
    #[inline]
    pub fn new(
        embedder: Arc<dyn Embedder>,
        big_book: SourceSearcher,
        reflections: SourceSearcher,
    ) -> Self {
        Self {
            embedder,
            big_book,
            reflections,
        }
    }

    /// Both sources over one store, with the configured index names and timeout
    #[inline]
    pub fn from_config(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorIndex>,
        config: &SearchConfig,
    ) -> Self {
        let timeout = config.source_timeout();
        Self::new(
            embedder,
            SourceSearcher::big_book(Arc::clone(&store), config.big_book_index.clone())
                .with_timeout(timeout),
            SourceSearcher::reflections(store, config.reflections_index.clone())
                .with_timeout(timeout),
        )
    }

    async fn resolve_vector(&self, query: Query) -> Result<Vec<f32>> {
        let vector = match query {
            Query::Text(text) => {
                if text.trim().is_empty() {
                    return Err(RagError::InvalidQuery("query text is empty".to_string()));
                }
                debug!("Embedding query: {:?}", text.chars().take(50).collect::<String>());
                self.embedder.embed(&text).await?
            }
            Query::Embedding(vector) => vector,
        };

        let expected = self.embedder.dimension();
        if vector.len() != expected {
            return Err(RagError::InvalidQuery(format!(
                "query vector has {} dimensions, expected {}",
                vector.len(),
                expected
            )));
        }

        Ok(vector)
    }

    /// Fused results across all sources
    ///
    /// Only an embedding failure or a malformed query is returned as an error;
    /// a failing source contributes nothing.
    #[inline]
    pub async fn search(
        &self,
        query: impl Into<Query>,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        self.search_with_health(query, options)
            .await
            .map(|outcome| outcome.results)
    }

    /// Like [`Self::search`], also reporting which sources were degraded
    #[inline]
    pub async fn search_with_health(
        &self,
        query: impl Into<Query>,
        options: &SearchOptions,
    ) -> Result<CombinedSearchOutcome> {
        let vector = self.resolve_vector(query.into()).await?;

        let (big_book, reflections) = tokio::join!(
            self.big_book.try_search(&vector, options),
            self.reflections.try_search(&vector, options),
        );

        let mut lists = Vec::with_capacity(2);
        let mut sources = Vec::with_capacity(2);
        for (searcher, outcome) in [(&self.big_book, big_book), (&self.reflections, reflections)] {
            let (results, status) = settle(searcher, outcome);
            lists.push(results);
            sources.push(status);
        }

        let results = fuse(lists, options.limit);
        info!(
            "Combined search found {} results ({} from Big Book, {} from Daily Reflections)",
            results.len(),
            sources[0].result_count,
            sources[1].result_count
        );

        Ok(CombinedSearchOutcome { results, sources })
    }

    /// Results from a single source, embedding a text query first
    ///
    /// A failing source yields an empty list, as in [`Self::search`].
    #[inline]
    pub async fn search_source(
        &self,
        source: SourceLabel,
        query: impl Into<Query>,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        let vector = self.resolve_vector(query.into()).await?;
        let searcher = match source {
            SourceLabel::BigBook => &self.big_book,
            SourceLabel::DailyReflection => &self.reflections,
        };

        let results = searcher.search(&vector, options).await;
        info!("{} search found {} results", source, results.len());
        Ok(results)
    }

    /// The stored reflection for `key`, if any
    #[inline]
    pub async fn find_reflection(&self, key: DateKey) -> Result<Option<ReflectionDocument>> {
        let record = self
            .reflections
            .store()
            .find_by_key(self.reflections.index(), &key.to_string())
            .await
            .map_err(|e| RagError::Database(e.to_string()))?;

        let Some(record) = record else {
            return Ok(None);
        };

        serde_json::from_value(record.document)
            .map(Some)
            .map_err(|e| RagError::Database(format!("Malformed reflection {key}: {e}")))
    }

    /// Reflections closest to the one stored for `key`, excluding itself
    #[inline]
    pub async fn similar_reflections(
        &self,
        key: DateKey,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        let record = self
            .reflections
            .store()
            .find_by_key(self.reflections.index(), &key.to_string())
            .await
            .map_err(|e| RagError::Database(e.to_string()))?
            .ok_or_else(|| RagError::InvalidQuery(format!("No reflection stored for {key}")))?;

        let vector = self.resolve_vector(Query::Embedding(record.vector)).await?;
        let widened = SearchOptions::new(options.limit.saturating_add(1), options.min_score);

        let mut results: Vec<SearchResult> = self
            .reflections
            .search(&vector, &widened)
            .await
            .into_iter()
            .filter(|result| result.date_key() != Some(key))
            .collect();
        results.truncate(options.limit);

        debug!("Found {} reflections similar to {}", results.len(), key);
        Ok(results)
    }
}

fn settle(
    searcher: &SourceSearcher,
    outcome: std::result::Result<Vec<SearchResult>, SourceError>,
) -> (Vec<SearchResult>, SourceStatus) {
    let (results, health) = match outcome {
        Ok(results) => (results, SourceHealth::Healthy),
        Err(e) => {
            warn!("{} search degraded: {}", searcher.source(), e);
            (Vec::new(), SourceHealth::Degraded(e.to_string()))
        }
    };

    let status = SourceStatus {
        source: searcher.source(),
        index: searcher.index().to_string(),
        health,
        result_count: results.len(),
    };
    (results, status)
}
