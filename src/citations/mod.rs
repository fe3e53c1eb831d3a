//! Compact, display-oriented views over search results.
//!
//! [`Citation`] is what a UI shows next to an answer. [`RetrievalContext`] is
//! the longer record kept alongside a response for auditing what the model saw.


use serde::Serialize;

use crate::dates::DateKey;
use crate::search::{ReflectionDocument, SearchResult, SourceLabel};

const CITATION_TEXT_CHARS: usize = 250;
const PINNED_COMMENT_CHARS: usize = 150;
const SNIPPET_CHARS: usize = 500;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub source: String,
    pub reference: String,
    pub text: String,
    pub score: f64,
    pub score_percentage: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalContext {
    pub source: String,
    pub reference: String,
    pub score: f64,
    pub chunk_id: Option<String>,
    pub page_number: Option<u32>,
    pub date_key: Option<DateKey>,
    pub text_snippet: Option<String>,
    pub url: Option<String>,
}

/// First `max_chars` characters of `text`
fn leading_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn round_score(score: f32) -> f64 {
    (f64::from(score) * 10_000.0).round() / 10_000.0
}

fn score_percentage(score: f32) -> String {
    format!("{}%", (f64::from(score) * 100.0).round())
}

impl Citation {
    /// Citation for one search result
    ///
    /// The ellipsis is appended even when the text is shorter than the cut.
    #[inline]
    pub fn from_result(result: &SearchResult) -> Self {
        Self {
            source: result.source.as_str().to_string(),
            reference: result.reference.clone(),
            text: leading_chars(&result.text, CITATION_TEXT_CHARS) + ELLIPSIS,
            score: round_score(result.score),
            score_percentage: score_percentage(result.score),
            url: result.url.clone(),
        }
    }

    /// Full-confidence citation for a reflection fetched by date
    #[inline]
    pub fn reflection_entry(reflection: &ReflectionDocument, key: DateKey) -> Self {
        Self {
            source: SourceLabel::DailyReflection.as_str().to_string(),
            reference: format!(
                "Daily Reflection, {} - {}",
                key.display_name(),
                reflection.title()
            ),
            text: leading_chars(&reflection_body(reflection), CITATION_TEXT_CHARS) + ELLIPSIS,
            score: 1.0,
            score_percentage: "100%".to_string(),
            url: Some(format!("/{key}")),
        }
    }

    /// Citation pinned ahead of search results when today's reflection is in the prompt
    #[inline]
    pub fn todays_reflection(reflection: &ReflectionDocument, key: DateKey) -> Self {
        Self {
            source: SourceLabel::DailyReflection.as_str().to_string(),
            reference: format!(
                "Today's Reflection ({}) - {}",
                key.display_name(),
                reflection.title()
            ),
            text: format!(
                "{}\n\n{}{ELLIPSIS}",
                reflection.quote(),
                leading_chars(reflection.comment(), PINNED_COMMENT_CHARS)
            ),
            score: 1.0,
            score_percentage: "100%".to_string(),
            url: Some(format!("/{key}")),
        }
    }
}

impl RetrievalContext {
    #[inline]
    pub fn from_result(result: &SearchResult) -> Self {
        Self {
            source: result.source.as_str().to_string(),
            reference: result.reference.clone(),
            score: round_score(result.score),
            chunk_id: result.chunk_id.clone(),
            page_number: result.page_number(),
            date_key: result.date_key(),
            text_snippet: (!result.text.is_empty())
                .then(|| leading_chars(&result.text, SNIPPET_CHARS)),
            url: result.url.clone(),
        }
    }

    #[inline]
    pub fn reflection_entry(reflection: &ReflectionDocument, key: DateKey) -> Self {
        Self {
            source: SourceLabel::DailyReflection.as_str().to_string(),
            reference: format!(
                "Daily Reflection, {} - {}",
                key.display_name(),
                reflection.title()
            ),
            score: 1.0,
            chunk_id: None,
            page_number: None,
            date_key: Some(key),
            text_snippet: Some(leading_chars(&reflection_body(reflection), SNIPPET_CHARS)),
            url: Some(format!("/{key}")),
        }
    }
}

/// Title, quote, comment and printed reference, blank-line separated
#[inline]
pub fn reflection_body(reflection: &ReflectionDocument) -> String {
    format!(
        "{}\n\n{}",
        reflection.combined_text(),
        reflection.reference.as_deref().unwrap_or_default()
    )
}

/// One citation per result, in order
#[inline]
pub fn format_citations(results: &[SearchResult]) -> Vec<Citation> {
    results.iter().map(Citation::from_result).collect()
}

#[inline]
pub fn retrieval_context(results: &[SearchResult]) -> Vec<RetrievalContext> {
    results.iter().map(RetrievalContext::from_result).collect()
}
