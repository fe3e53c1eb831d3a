//! In-memory stand-ins for the embedder and the vector index.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::database::{DocumentRecord, RawCandidate, SourceError, VectorIndex, VectorQuery};
use crate::embeddings::{Embedder, EmbeddingError};

pub(crate) const BIG_BOOK_INDEX: &str = "bigbook_page_vectors";
pub(crate) const REFLECTIONS_INDEX: &str = "reflections";
pub(crate) const DIMENSION: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedQuery {
    pub index: String,
    pub vector: Vec<f32>,
    pub num_candidates: usize,
    pub limit: usize,
}

enum Response {
    Candidates(Vec<RawCandidate>),
    Fail(String),
}

#[derive(Default)]
pub(crate) struct FakeIndex {
    responses: HashMap<String, Response>,
    records: HashMap<(String, String), DocumentRecord>,
    delays: HashMap<String, Duration>,
    lookup_failure: Option<String>,
    queries: Mutex<Vec<RecordedQuery>>,
}

impl FakeIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_candidates(mut self, index: &str, candidates: Vec<RawCandidate>) -> Self {
        self.responses
            .insert(index.to_string(), Response::Candidates(candidates));
        self
    }

    pub(crate) fn failing(mut self, index: &str, message: &str) -> Self {
        self.responses
            .insert(index.to_string(), Response::Fail(message.to_string()));
        self
    }

    pub(crate) fn slow(mut self, index: &str, delay: Duration) -> Self {
        self.delays.insert(index.to_string(), delay);
        self
    }

    pub(crate) fn with_record(mut self, index: &str, record: DocumentRecord) -> Self {
        let key = record.lookup_key.clone().unwrap_or_default();
        self.records.insert((index.to_string(), key), record);
        self
    }

    pub(crate) fn failing_lookups(mut self, message: &str) -> Self {
        self.lookup_failure = Some(message.to_string());
        self
    }

    pub(crate) fn queries(&self) -> Vec<RecordedQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn vector_search(
        &self,
        query: &VectorQuery<'_>,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(RecordedQuery {
                index: query.index.to_string(),
                vector: query.vector.to_vec(),
                num_candidates: query.num_candidates,
                limit: query.limit,
            });
        }

        if let Some(delay) = self.delays.get(query.index) {
            tokio::time::sleep(*delay).await;
        }

        match self.responses.get(query.index) {
            Some(Response::Candidates(candidates)) => {
                let mut candidates = candidates.clone();
                candidates.sort_by(|a, b| {
                    b.score
                        .unwrap_or(f32::MIN)
                        .total_cmp(&a.score.unwrap_or(f32::MIN))
                });
                candidates.truncate(query.limit);
                Ok(candidates)
            }
            Some(Response::Fail(message)) => Err(SourceError::unavailable(query.index, message)),
            None => Err(SourceError::unavailable(query.index, "no such index")),
        }
    }

    async fn find_by_key(
        &self,
        index: &str,
        key: &str,
    ) -> Result<Option<DocumentRecord>, SourceError> {
        if let Some(message) = &self.lookup_failure {
            return Err(SourceError::query(index, message));
        }
        Ok(self
            .records
            .get(&(index.to_string(), key.to_string()))
            .cloned())
    }
}

pub(crate) struct FakeEmbedder {
    vector: Option<Vec<f32>>,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub(crate) fn returning(vector: Vec<f32>) -> Self {
        Self {
            vector: Some(vector),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            vector: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vector.clone().ok_or(EmbeddingError::Status {
            status: 503,
            body: "upstream unavailable".to_string(),
        })
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }
}

pub(crate) fn big_book_candidate(page: u32, score: f32) -> RawCandidate {
    RawCandidate {
        document: json!({
            "chunkId": format!("chunk-{page}"),
            "pageNumber": page,
            "chapterTitle": "How It Works",
            "text": format!("Big Book text from page {page}"),
        }),
        score: Some(score),
    }
}

pub(crate) fn reflection_document(month: u32, day: u32, title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "quote": format!("Quote for {title}"),
        "comment": format!("Comment about {title}"),
        "reference": "AS BILL SEES IT, p. 1",
        "month": month,
        "day": day,
        "dateKey": format!("{month:02}-{day:02}"),
    })
}

pub(crate) fn reflection_candidate(month: u32, day: u32, title: &str, score: f32) -> RawCandidate {
    RawCandidate {
        document: reflection_document(month, day, title),
        score: Some(score),
    }
}
