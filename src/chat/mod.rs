//! Turns one user question into either a direct answer or a grounded prompt.
//!
//! A question naming a reflection date is answered with the stored reflection
//! unless it asks what the reflection means. Everything else goes through the
//! combined search, and the ranked passages become citations and the prompt.

#[cfg(test)]
mod tests;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::citations::{
    Citation, RetrievalContext, format_citations, reflection_body, retrieval_context,
};
use crate::dates::{DateKey, parse_date_from_query, refers_to_todays_reflection};
use crate::prompt::{ChatMessage, asks_for_meaning, create_llm_prompt};
use crate::search::{CombinedSearch, ReflectionDocument, SearchOptions, SourceStatus};
use crate::{RagError, Result};

pub const NO_RESULTS_RESPONSE: &str = "I don't have enough information to answer that question specifically based on AA literature. If you'd like to know more about Alcoholics Anonymous, you might try asking about the 12 steps, the Big Book, or daily reflections.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatReply {
    /// The reflection for a requested date, shown as is
    Reflection {
        response: String,
        date_key: DateKey,
        citations: Vec<Citation>,
        retrieval_context: Vec<RetrievalContext>,
    },
    /// A requested date has no stored reflection
    ReflectionNotFound { response: String, date_key: DateKey },
    /// Nothing in either collection scored above the threshold
    NoResults {
        response: String,
        sources: Vec<SourceStatus>,
    },
    Prompt(PreparedPrompt),
}

impl ChatReply {
    /// Text to show the user directly, when no model call is needed
    #[inline]
    pub fn direct_response(&self) -> Option<&str> {
        match self {
            Self::Reflection { response, .. }
            | Self::ReflectionNotFound { response, .. }
            | Self::NoResults { response, .. } => Some(response),
            Self::Prompt(_) => None,
        }
    }
}

/// Everything needed to make the model call and render its sources
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedPrompt {
    pub prompt: String,
    pub citations: Vec<Citation>,
    pub retrieval_context: Vec<RetrievalContext>,
    pub todays_reflection: Option<ReflectionDocument>,
    pub sources: Vec<SourceStatus>,
}

pub struct ChatPipeline {
    search: CombinedSearch,
    options: SearchOptions,
}

impl ChatPipeline {
    #[inline]
    pub fn new(search: CombinedSearch, options: SearchOptions) -> Self {
        Self { search, options }
    }

    #[inline]
    pub fn search(&self) -> &CombinedSearch {
        &self.search
    }

    /// Prepare a reply to `query`, resolving relative dates against `today`
    #[inline]
    pub async fn prepare(
        &self,
        query: &str,
        history: &[ChatMessage],
        today: NaiveDate,
    ) -> Result<ChatReply> {
        if query.trim().is_empty() {
            return Err(RagError::InvalidQuery("query text is empty".to_string()));
        }

        let mut todays_reflection = None;

        if let Some(key) = parse_date_from_query(query, today) {
            debug!("Date detected in query: {}", key);
            match self.search.find_reflection(key).await {
                Ok(Some(reflection)) if asks_for_meaning(query) => {
                    debug!("Query asks about the meaning of {}, using the prompt", key);
                    todays_reflection = Some(reflection);
                }
                Ok(Some(reflection)) => return Ok(reflection_reply(&reflection, key)),
                Ok(None) => {
                    return Ok(ChatReply::ReflectionNotFound {
                        response: format!(
                            "I couldn't find a reflection for {}. The reflection may not exist in the database for that date.",
                            key.display_name()
                        ),
                        date_key: key,
                    });
                }
                Err(e) => warn!("Reflection lookup for {} failed, falling back to search: {}", key, e),
            }
        }

        let outcome = self.search.search_with_health(query, &self.options).await?;
        info!("Found {} relevant passages", outcome.results.len());

        if outcome.results.is_empty() {
            return Ok(ChatReply::NoResults {
                response: NO_RESULTS_RESPONSE.to_string(),
                sources: outcome.sources,
            });
        }

        if todays_reflection.is_none() && refers_to_todays_reflection(query) {
            let key = DateKey::from_date(today);
            match self.search.find_reflection(key).await {
                Ok(reflection) => todays_reflection = reflection,
                Err(e) => warn!("Could not load today's reflection ({}): {}", key, e),
            }
        }

        let mut citations = format_citations(&outcome.results);
        if let Some(reflection) = &todays_reflection {
            let key = reflection.key().unwrap_or_else(|| DateKey::from_date(today));
            citations.insert(0, Citation::todays_reflection(reflection, key));
        }

        let prompt = create_llm_prompt(
            query,
            &outcome.results,
            history,
            todays_reflection.as_ref(),
        );

        Ok(ChatReply::Prompt(PreparedPrompt {
            prompt,
            citations,
            retrieval_context: retrieval_context(&outcome.results),
            todays_reflection,
            sources: outcome.sources,
        }))
    }
}

fn reflection_reply(reflection: &ReflectionDocument, key: DateKey) -> ChatReply {
    ChatReply::Reflection {
        response: format!(
            "Here's the daily reflection for {}:\n\n{}",
            key.display_name(),
            reflection_body(reflection)
        ),
        date_key: key,
        citations: vec![Citation::reflection_entry(reflection, key)],
        retrieval_context: vec![RetrievalContext::reflection_entry(reflection, key)],
    }
}
