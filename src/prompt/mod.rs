//! Grounded LLM prompt assembly.
//!
//! [`create_llm_prompt`] renders, in order: conversation history, today's
//! reflection, the question, an intent-specific instruction, the excerpts
//! grouped by source, and the fixed instruction footer.


pub mod intent;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::search::{ReflectionDocument, SearchResult, SourceLabel};

pub use intent::{Intent, asks_for_meaning};

const PREAMBLE: &str = "You are a compassionate and knowledgeable recovery assistant for Alcoholics Anonymous.
Your responses should be helpful, supportive, and based on AA literature.";

const QUESTION_LEAD: &str =
    "Please answer the following question based on the provided excerpts from AA literature:";

const SOURCE_SEPARATOR: &str = "\n\n----------\n\n";

const BASE_INSTRUCTIONS: &str = r#"Instructions:
1. Base your answer only on the provided excerpts and widely known AA principles.
2. Be compassionate, supportive, and non-judgmental in your response.
3. DO NOT invent or assume information not present in the excerpts.
4. When directly referencing content from the excerpts:
   - For Big Book content, use the format "As mentioned in the Big Book, page X..."
   - For Daily Reflections, use the format "As the reflection for [date] states..."
   - For today's reflection (if provided), use "As today's reflection states..."
5. If the excerpts don't contain relevant information, acknowledge this limitation politely.
6. Format your answer in clear, readable paragraphs.
7. Use a warm, supportive tone appropriate for someone in recovery or seeking help."#;

const MEANING_INSTRUCTION: &str = "8. IMPORTANT: Since the user is asking about the meaning of the reflection, provide a detailed explanation of its significance, themes, and recovery lessons. Don't just paraphrase, but deeply analyze what the reflection teaches.";

const LITERATURE_INSTRUCTION: &str = "8. IMPORTANT: Include the exact wording from the Big Book when possible, followed by your explanation of what this means in practical terms.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[inline]
    pub fn speaker(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[inline]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[inline]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

fn format_history(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|message| format!("{}: {}", message.role.speaker(), message.content))
        .join("\n\n")
}

fn format_todays_reflection(reflection: &ReflectionDocument) -> String {
    let heading = reflection.key().map_or_else(
        || "TODAY'S REFLECTION:".to_string(),
        |key| format!("TODAY'S REFLECTION ({}):", key.display_name()),
    );
    format!(
        "{heading}\nTitle: {}\nQuote: \"{}\"\nReflection: {}\nReference: {}",
        reflection.title(),
        reflection.quote(),
        reflection.comment(),
        reflection.reference.as_deref().unwrap_or_default()
    )
}

/// Excerpts grouped by source, Big Book first, each group numbered from 1
#[inline]
pub fn format_excerpts(results: &[SearchResult]) -> String {
    let big_book = results
        .iter()
        .filter(|r| r.source == SourceLabel::BigBook)
        .enumerate()
        .map(|(i, r)| {
            let label = r
                .page_number()
                .map_or_else(|| r.reference.clone(), |page| format!("Page {page}"));
            format!("[B{}] {label}:\n\"{}\"", i + 1, r.text)
        })
        .join("\n\n");
    let reflections = results
        .iter()
        .filter(|r| r.source == SourceLabel::DailyReflection)
        .enumerate()
        .map(|(i, r)| format!("[R{}] {}:\n\"{}\"", i + 1, r.reference, r.text))
        .join("\n\n");

    let mut context = String::new();
    if !big_book.is_empty() {
        context.push_str("From AA Big Book:\n");
        context.push_str(&big_book);
    }
    if !reflections.is_empty() {
        if !big_book.is_empty() {
            context.push_str(SOURCE_SEPARATOR);
        }
        context.push_str("From Daily Reflections:\n");
        context.push_str(&reflections);
    }
    context
}

/// Build the single system prompt for one answer
///
/// An empty result list still yields a complete prompt with an empty excerpts
/// section.
#[inline]
pub fn create_llm_prompt(
    query: &str,
    results: &[SearchResult],
    history: &[ChatMessage],
    todays_reflection: Option<&ReflectionDocument>,
) -> String {
    let intent = Intent::detect(query);
    let mut sections = vec![PREAMBLE.to_string()];

    if !history.is_empty() {
        sections.push(format!(
            "Recent conversation history:\n{}",
            format_history(history)
        ));
    }
    if let Some(reflection) = todays_reflection {
        sections.push(format_todays_reflection(reflection));
    }

    sections.push(format!("{QUESTION_LEAD}\n\nQuestion: {query}"));

    if let Some(instruction) = intent.special_instruction() {
        sections.push(instruction.to_string());
    }

    sections.push(format!(
        "Relevant excerpts (ranked by relevance):\n{}",
        format_excerpts(results)
    ));

    let mut footer = vec![BASE_INSTRUCTIONS];
    if todays_reflection.is_some() && intent.meaning {
        footer.push(MEANING_INSTRUCTION);
    }
    if intent.is_about_literature() {
        footer.push(LITERATURE_INSTRUCTION);
    }
    sections.push(footer.join("\n"));
    sections.push("Your answer:".to_string());

    sections.join("\n\n")
}
