//! Collection-specific document shapes and their mapping onto [`SearchResult`].

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Locator, SearchResult, SourceLabel};
use crate::database::RawCandidate;
use crate::dates::DateKey;

/// A Big Book page chunk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BigBookDocument {
    #[serde(alias = "chunkId")]
    pub chunk_id: Option<String>,
    #[serde(alias = "pageId")]
    pub page_id: Option<String>,
    #[serde(alias = "pageNumber")]
    pub page_number: Option<u32>,
    #[serde(alias = "chapterTitle")]
    pub chapter_title: Option<String>,
    pub text: Option<String>,
}

/// One Daily Reflection entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionDocument {
    pub title: Option<String>,
    pub quote: Option<String>,
    pub comment: Option<String>,
    /// Printed source of the quote
    pub reference: Option<String>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    #[serde(alias = "dateKey")]
    pub date_key: Option<String>,
}

impl ReflectionDocument {
    /// Calendar key from `date_key`, falling back to `month` and `day`
    #[inline]
    pub fn key(&self) -> Option<DateKey> {
        self.date_key
            .as_deref()
            .and_then(|key| key.parse().ok())
            .or_else(|| DateKey::new(self.month?, self.day?).ok())
    }

    #[inline]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    #[inline]
    pub fn quote(&self) -> &str {
        self.quote.as_deref().unwrap_or_default()
    }

    #[inline]
    pub fn comment(&self) -> &str {
        self.comment.as_deref().unwrap_or_default()
    }

    /// Searchable text: title, quote and comment separated by blank lines
    #[inline]
    pub fn combined_text(&self) -> String {
        format!("{}\n\n{}\n\n{}", self.title(), self.quote(), self.comment())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceDocument {
    BigBook(BigBookDocument),
    Reflection(ReflectionDocument),
}

impl SourceDocument {
    #[inline]
    pub fn decode(source: SourceLabel, value: serde_json::Value) -> serde_json::Result<Self> {
        match source {
            SourceLabel::BigBook => serde_json::from_value(value).map(Self::BigBook),
            SourceLabel::DailyReflection => serde_json::from_value(value).map(Self::Reflection),
        }
    }

    #[inline]
    pub fn source(&self) -> SourceLabel {
        match self {
            Self::BigBook(_) => SourceLabel::BigBook,
            Self::Reflection(_) => SourceLabel::DailyReflection,
        }
    }

    #[inline]
    pub fn into_result(self, score: f32) -> SearchResult {
        match self {
            Self::BigBook(doc) => {
                let (reference, url) = match doc.page_number {
                    Some(page) => (
                        format!("Big Book, Page {page}"),
                        Some(format!("/big-book/page/{page}")),
                    ),
                    None => ("Big Book".to_string(), None),
                };
                SearchResult {
                    text: doc.text.unwrap_or_default(),
                    score,
                    source: SourceLabel::BigBook,
                    reference,
                    locator: doc.page_number.map(Locator::Page),
                    url,
                    chunk_id: doc.chunk_id,
                    chapter_title: doc.chapter_title,
                }
            }
            Self::Reflection(doc) => {
                let key = doc.key();
                let reference = match key {
                    Some(key) => {
                        format!("Daily Reflection, {} - {}", key.display_name(), doc.title())
                    }
                    None => format!("Daily Reflection - {}", doc.title()),
                };
                SearchResult {
                    text: doc.combined_text(),
                    score,
                    source: SourceLabel::DailyReflection,
                    reference,
                    locator: key.map(Locator::Date),
                    url: key.map(|key| format!("/{key}")),
                    chunk_id: None,
                    chapter_title: None,
                }
            }
        }
    }
}

/// Shape one raw candidate, or drop it when it has no usable score or cannot be decoded
#[inline]
pub fn normalize_candidate(source: SourceLabel, candidate: RawCandidate) -> Option<SearchResult> {
    let score = candidate.score.filter(|s| s.is_finite())?;
    match SourceDocument::decode(source, candidate.document) {
        Ok(document) => Some(document.into_result(score)),
        Err(e) => {
            warn!("Skipping malformed {} document: {}", source, e);
            None
        }
    }
}
