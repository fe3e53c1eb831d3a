use super::*;
use crate::config::SearchConfig;
use crate::database::{DocumentRecord, VectorIndex};
use crate::embeddings::Embedder;
use crate::search::fakes::{
    BIG_BOOK_INDEX, FakeEmbedder, FakeIndex, REFLECTIONS_INDEX, big_book_candidate,
    reflection_candidate, reflection_document,
};
use std::sync::Arc;

const VECTOR: [f32; 4] = [0.5, 0.5, 0.5, 0.5];

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 5).expect("valid date")
}

fn stored_reflection(month: u32, day: u32, title: &str) -> DocumentRecord {
    DocumentRecord::new(VECTOR.to_vec(), reflection_document(month, day, title))
        .with_lookup_key(format!("{month:02}-{day:02}"))
}

fn searchable_index() -> FakeIndex {
    FakeIndex::new()
        .with_candidates(
            BIG_BOOK_INDEX,
            vec![big_book_candidate(417, 0.81), big_book_candidate(62, 0.4)],
        )
        .with_candidates(
            REFLECTIONS_INDEX,
            vec![reflection_candidate(3, 3, "LET GO", 0.7)],
        )
        .with_record(REFLECTIONS_INDEX, stored_reflection(1, 5, "ACCEPTANCE"))
}

fn pipeline(index: FakeIndex) -> (ChatPipeline, Arc<FakeEmbedder>) {
    let embedder = Arc::new(FakeEmbedder::returning(VECTOR.to_vec()));
    let search = CombinedSearch::from_config(
        Arc::clone(&embedder) as Arc<dyn Embedder>,
        Arc::new(index) as Arc<dyn VectorIndex>,
        &SearchConfig::default(),
    );
    (
        ChatPipeline::new(search, SearchOptions::new(7, 0.58)),
        embedder,
    )
}

#[tokio::test]
async fn dated_request_returns_reflection_directly() {
    let (chat, embedder) = pipeline(searchable_index());

    let reply = chat
        .prepare("Show me the reflection for January 5", &[], today())
        .await
        .expect("should prepare");

    let ChatReply::Reflection {
        response,
        date_key,
        citations,
        retrieval_context,
    } = reply
    else {
        panic!("expected a direct reflection reply");
    };
    assert_eq!(date_key.to_string(), "01-05");
    assert!(response.starts_with("Here's the daily reflection for January 5:\n\nACCEPTANCE\n\n"));
    assert!(response.ends_with("AS BILL SEES IT, p. 1"));
    assert_eq!(citations.len(), 1);
    assert_eq!(citations[0].reference, "Daily Reflection, January 5 - ACCEPTANCE");
    assert_eq!(citations[0].score_percentage, "100%");
    assert_eq!(retrieval_context[0].url.as_deref(), Some("/01-05"));
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn missing_dated_reflection_is_reported() {
    let (chat, _) = pipeline(searchable_index());

    let reply = chat
        .prepare("what was the reading on 2/14", &[], today())
        .await
        .expect("should prepare");

    assert!(matches!(reply, ChatReply::ReflectionNotFound { .. }));
    assert_eq!(
        reply.direct_response(),
        Some("I couldn't find a reflection for February 14. The reflection may not exist in the database for that date.")
    );
}

#[tokio::test]
async fn asking_for_meaning_uses_the_prompt() {
    let (chat, embedder) = pipeline(searchable_index());

    let reply = chat
        .prepare("What does today's reflection mean?", &[], today())
        .await
        .expect("should prepare");

    let ChatReply::Prompt(prepared) = reply else {
        panic!("expected a prompt");
    };
    assert_eq!(embedder.calls(), 1);
    assert_eq!(
        prepared.todays_reflection.as_ref().map(ReflectionDocument::title),
        Some("ACCEPTANCE")
    );
    assert_eq!(
        prepared.citations[0].reference,
        "Today's Reflection (January 5) - ACCEPTANCE"
    );
    assert_eq!(prepared.citations.len(), 3);
    assert_eq!(prepared.retrieval_context.len(), 2);
    assert!(prepared.prompt.contains("TODAY'S REFLECTION (January 5):"));
    assert!(prepared.prompt.contains("EXPLAINING the meaning"));
}

#[tokio::test]
async fn general_question_builds_grounded_prompt() {
    let (chat, _) = pipeline(searchable_index());
    let history = vec![ChatMessage::user("Hi"), ChatMessage::assistant("Hello")];

    let reply = chat
        .prepare("How do I practice acceptance?", &history, today())
        .await
        .expect("should prepare");

    let ChatReply::Prompt(prepared) = reply else {
        panic!("expected a prompt");
    };
    assert_eq!(prepared.todays_reflection, None);
    assert_eq!(
        prepared
            .citations
            .iter()
            .map(|c| c.reference.as_str())
            .collect::<Vec<_>>(),
        vec!["Big Book, Page 417", "Daily Reflection, March 3 - LET GO"]
    );
    assert!(prepared.prompt.contains("User: Hi\n\nAssistant: Hello"));
    assert!(prepared.prompt.contains("[B1] Page 417:"));
    assert!(prepared.sources.iter().all(SourceStatus::is_healthy));
}

#[tokio::test]
async fn no_results_gives_fallback() {
    let index = FakeIndex::new()
        .with_candidates(BIG_BOOK_INDEX, vec![big_book_candidate(1, 0.2)])
        .with_candidates(REFLECTIONS_INDEX, Vec::new());
    let (chat, _) = pipeline(index);

    let reply = chat
        .prepare("What's the weather like?", &[], today())
        .await
        .expect("should prepare");

    assert_eq!(reply.direct_response(), Some(NO_RESULTS_RESPONSE));
}

#[tokio::test]
async fn failed_date_lookup_falls_back_to_search() {
    let (chat, embedder) = pipeline(searchable_index().failing_lookups("connection reset"));

    let reply = chat
        .prepare("reflection for jan 5", &[], today())
        .await
        .expect("should prepare");

    assert!(matches!(reply, ChatReply::Prompt(ref p) if p.todays_reflection.is_none()));
    assert_eq!(embedder.calls(), 1);
}

#[tokio::test]
async fn empty_question_is_rejected() {
    let (chat, _) = pipeline(searchable_index());
    let result = chat.prepare("  ", &[], today()).await;
    assert!(matches!(result, Err(RagError::InvalidQuery(_))));
}

#[test]
fn replies_serialize_with_kind() {
    let reply = ChatReply::NoResults {
        response: NO_RESULTS_RESPONSE.to_string(),
        sources: Vec::new(),
    };
    let json = serde_json::to_value(&reply).expect("should serialize");
    assert_eq!(json["kind"], "no_results");
    assert_eq!(json["response"], NO_RESULTS_RESPONSE);
}
