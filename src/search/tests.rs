use super::*;

#[test]
fn candidate_pool_scales_with_limit() {
    assert_eq!(SearchOptions::new(1, 0.6).num_candidates(), 100);
    assert_eq!(SearchOptions::new(10, 0.6).num_candidates(), 100);
    assert_eq!(SearchOptions::new(25, 0.6).num_candidates(), 250);
    assert_eq!(SearchOptions::new(usize::MAX, 0.6).num_candidates(), usize::MAX);
}

#[test]
fn source_labels() {
    assert_eq!(SourceLabel::BigBook.to_string(), "Big Book");
    assert_eq!(SourceLabel::DailyReflection.as_str(), "Daily Reflection");
    assert_eq!(
        serde_json::to_string(&SourceLabel::DailyReflection).expect("should serialize"),
        "\"Daily Reflection\""
    );
}

#[test]
fn query_conversions() {
    assert_eq!(Query::from("fear"), Query::Text("fear".to_string()));
    assert_eq!(
        Query::from(String::from("faith")),
        Query::Text("faith".to_string())
    );
    assert_eq!(Query::from(vec![0.5, 0.5]), Query::Embedding(vec![0.5, 0.5]));
}

#[test]
fn locator_accessors() {
    let key = DateKey::new(8, 1).expect("valid key");
    let mut result = SearchResult {
        text: String::new(),
        score: 0.8,
        source: SourceLabel::DailyReflection,
        reference: String::new(),
        locator: Some(Locator::Date(key)),
        url: None,
        chunk_id: None,
        chapter_title: None,
    };
    assert_eq!(result.date_key(), Some(key));
    assert_eq!(result.page_number(), None);

    result.locator = Some(Locator::Page(417));
    assert_eq!(result.page_number(), Some(417));
    assert_eq!(result.date_key(), None);

    let json = serde_json::to_value(&result).expect("should serialize");
    assert_eq!(json["locator"]["page"], 417);
}
