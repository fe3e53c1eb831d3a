use super::*;
use serde_json::json;

fn candidate(document: serde_json::Value, score: Option<f32>) -> RawCandidate {
    RawCandidate { document, score }
}

#[test]
fn big_book_result_shape() {
    let result = normalize_candidate(
        SourceLabel::BigBook,
        candidate(
            json!({
                "chunkId": "p64-1",
                "pageId": "page-64",
                "pageNumber": 64,
                "chapterTitle": "How It Works",
                "text": "Resentment is the \"number one\" offender.",
            }),
            Some(0.81),
        ),
    )
    .expect("should normalize");

    assert_eq!(result.source, SourceLabel::BigBook);
    assert_eq!(result.reference, "Big Book, Page 64");
    assert_eq!(result.url.as_deref(), Some("/big-book/page/64"));
    assert_eq!(result.page_number(), Some(64));
    assert_eq!(result.date_key(), None);
    assert_eq!(result.chunk_id.as_deref(), Some("p64-1"));
    assert_eq!(result.chapter_title.as_deref(), Some("How It Works"));
    assert!((result.score - 0.81).abs() < f32::EPSILON);
}

#[test]
fn snake_case_fields_are_accepted() {
    let result = normalize_candidate(
        SourceLabel::BigBook,
        candidate(json!({ "page_number": 86, "text": "On awakening" }), Some(0.7)),
    )
    .expect("should normalize");

    assert_eq!(result.page_number(), Some(86));
    assert_eq!(result.text, "On awakening");
}

#[test]
fn reflection_result_shape() {
    let result = normalize_candidate(
        SourceLabel::DailyReflection,
        candidate(
            json!({
                "title": "ACCEPTANCE",
                "quote": "Acceptance is the answer to all my problems today.",
                "comment": "When I am disturbed, it is because...",
                "reference": "ALCOHOLICS ANONYMOUS, p. 417",
                "month": 1,
                "day": 5,
                "dateKey": "01-05",
            }),
            Some(0.74),
        ),
    )
    .expect("should normalize");

    assert_eq!(result.source, SourceLabel::DailyReflection);
    assert_eq!(result.reference, "Daily Reflection, January 5 - ACCEPTANCE");
    assert_eq!(result.url.as_deref(), Some("/01-05"));
    assert_eq!(
        result.text,
        "ACCEPTANCE\n\nAcceptance is the answer to all my problems today.\n\nWhen I am disturbed, it is because..."
    );
    assert_eq!(
        result.date_key(),
        Some(DateKey::new(1, 5).expect("valid key"))
    );
    assert_eq!(result.page_number(), None);
}

#[test]
fn reflection_key_falls_back_to_month_and_day() {
    let doc = ReflectionDocument {
        month: Some(12),
        day: Some(24),
        ..ReflectionDocument::default()
    };
    assert_eq!(doc.key(), Some(DateKey::new(12, 24).expect("valid key")));

    let doc = ReflectionDocument {
        date_key: Some("garbage".to_string()),
        month: Some(3),
        day: Some(1),
        ..ReflectionDocument::default()
    };
    assert_eq!(doc.key(), Some(DateKey::new(3, 1).expect("valid key")));
}

#[test]
fn missing_fields_use_defaults() {
    let big_book = normalize_candidate(SourceLabel::BigBook, candidate(json!({}), Some(0.9)))
        .expect("should normalize empty document");
    assert_eq!(big_book.text, "");
    assert_eq!(big_book.reference, "Big Book");
    assert_eq!(big_book.url, None);
    assert_eq!(big_book.locator, None);

    let reflection = normalize_candidate(
        SourceLabel::DailyReflection,
        candidate(json!({ "title": "HUMILITY" }), Some(0.9)),
    )
    .expect("should normalize partial document");
    assert_eq!(reflection.reference, "Daily Reflection - HUMILITY");
    assert_eq!(reflection.text, "HUMILITY\n\n\n\n");
    assert_eq!(reflection.url, None);
}

#[test]
fn missing_score_excludes_candidate() {
    assert_eq!(
        normalize_candidate(SourceLabel::BigBook, candidate(json!({ "text": "x" }), None)),
        None
    );
    assert_eq!(
        normalize_candidate(
            SourceLabel::BigBook,
            candidate(json!({ "text": "x" }), Some(f32::NAN))
        ),
        None
    );
}

#[test]
fn undecodable_document_is_skipped() {
    assert_eq!(
        normalize_candidate(SourceLabel::BigBook, candidate(serde_json::Value::Null, Some(0.9))),
        None
    );
    assert_eq!(
        normalize_candidate(
            SourceLabel::BigBook,
            candidate(json!({ "pageNumber": "sixty" }), Some(0.9))
        ),
        None
    );
}

#[test]
fn decode_tags_by_source() {
    let doc = SourceDocument::decode(SourceLabel::DailyReflection, json!({ "title": "FAITH" }))
        .expect("should decode");
    assert_eq!(doc.source(), SourceLabel::DailyReflection);
    assert!(matches!(doc, SourceDocument::Reflection(ref r) if r.title() == "FAITH"));
}
