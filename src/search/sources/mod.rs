
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::documents::normalize_candidate;
use super::fusion::{dedupe_by_page, sort_by_score};
use super::{SearchOptions, SearchResult, SourceLabel};
use crate::database::{SourceError, VectorIndex, VectorQuery};

const BIG_BOOK_ANN_MULTIPLIER: usize = 3;
const REFLECTIONS_ANN_MULTIPLIER: usize = 2;

/// Searches a single collection's vector index
#[derive(Clone)]
pub struct SourceSearcher {
    store: Arc<dyn VectorIndex>,
    source: SourceLabel,
    index: String,
    ann_multiplier: usize,
    dedupe_pages: bool,
    timeout: Option<Duration>,
}

impl SourceSearcher {
    /// Big Book pages, at most one result per page
    #[inline]
    pub fn big_book(store: Arc<dyn VectorIndex>, index: impl Into<String>) -> Self {
        Self {
            store,
            source: SourceLabel::BigBook,
            index: index.into(),
            ann_multiplier: BIG_BOOK_ANN_MULTIPLIER,
            dedupe_pages: true,
            timeout: None,
        }
    }

    #[inline]
    pub fn reflections(store: Arc<dyn VectorIndex>, index: impl Into<String>) -> Self {
        Self {
            store,
            source: SourceLabel::DailyReflection,
            index: index.into(),
            ann_multiplier: REFLECTIONS_ANN_MULTIPLIER,
            dedupe_pages: false,
            timeout: None,
        }
    }

    /// Bound each search; an expired search fails with [`SourceError::Timeout`]
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[inline]
    pub fn source(&self) -> SourceLabel {
        self.source
    }

    #[inline]
    pub fn index(&self) -> &str {
        &self.index
    }

    #[inline]
    pub fn store(&self) -> &Arc<dyn VectorIndex> {
        &self.store
    }

    /// Search and surface index failures to the caller
    ///
    /// Results are at most `options.limit` long, all scored at or above
    /// `options.min_score`, best first.
    #[inline]
    pub async fn try_search(
        &self,
        vector: &[f32],
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, SourceError> {
        if options.limit == 0 {
            return Ok(Vec::new());
        }

        let query = VectorQuery {
            index: &self.index,
            vector,
            num_candidates: options.num_candidates(),
            limit: options.limit.saturating_mul(self.ann_multiplier),
        };

        let candidates = match self.timeout {
            Some(after) => tokio::time::timeout(after, self.store.vector_search(&query))
                .await
                .map_err(|_| SourceError::Timeout {
                    index: self.index.clone(),
                    after,
                })??,
            None => self.store.vector_search(&query).await?,
        };
        let candidate_count = candidates.len();

        let mut results: Vec<SearchResult> = candidates
            .into_iter()
            .filter_map(|candidate| normalize_candidate(self.source, candidate))
            .filter(|result| result.score >= options.min_score)
            .collect();
        sort_by_score(&mut results);
        if self.dedupe_pages {
            results = dedupe_by_page(results);
        }
        results.truncate(options.limit);

        debug!(
            "{} search returned {} of {} candidates",
            self.source,
            results.len(),
            candidate_count
        );
        if let Some(top) = results.first() {
            debug!("Top {} score: {:.4}", self.source, top.score);
        }

        Ok(results)
    }

    /// Search, degrading to an empty list when the index fails
    #[inline]
    pub async fn search(&self, vector: &[f32], options: &SearchOptions) -> Vec<SearchResult> {
        self.try_search(vector, options)
            .await
            .unwrap_or_else(|e| {
                warn!("{} search degraded: {}", self.source, e);
                Vec::new()
            })
    }
}
