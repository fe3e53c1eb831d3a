use criterion::{Criterion, criterion_group, criterion_main};
use recovery_rag::citations::format_citations;
use recovery_rag::dates::DateKey;
use recovery_rag::prompt::{ChatMessage, create_llm_prompt};
use recovery_rag::search::{Locator, SearchResult, SourceLabel, fuse};
use std::hint::black_box;

fn big_book_results(count: u32) -> Vec<SearchResult> {
    (0..count)
        .map(|i| SearchResult {
            text: "Resentment is the number one offender. ".repeat(20),
            score: 0.95 - i as f32 * 0.01,
            source: SourceLabel::BigBook,
            reference: format!("Big Book, Page {}", 60 + i),
            locator: Some(Locator::Page(60 + i)),
            url: Some(format!("/big-book/page/{}", 60 + i)),
            chunk_id: Some(format!("chunk_{i}")),
            chapter_title: Some("How It Works".to_string()),
        })
        .collect()
}

fn reflection_results(count: u32) -> Vec<SearchResult> {
    (0..count)
        .map(|i| {
            let key = DateKey::new(1, 1 + i % 28).expect("valid key");
            SearchResult {
                text: "ACCEPTANCE\n\nAcceptance is the answer.\n\nWhen I am disturbed...".repeat(5),
                score: 0.945 - i as f32 * 0.01,
                source: SourceLabel::DailyReflection,
                reference: format!("Daily Reflection, {} - ACCEPTANCE", key.display_name()),
                locator: Some(Locator::Date(key)),
                url: Some(format!("/{key}")),
                chunk_id: None,
                chapter_title: None,
            }
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let big_book = big_book_results(21);
    let reflections = reflection_results(14);
    let history = vec![
        ChatMessage::user("I keep thinking about my old boss."),
        ChatMessage::assistant("That sounds painful. Resentment is a common struggle."),
    ];

    c.bench_function("fuse", |b| {
        b.iter(|| fuse(black_box([big_book.clone(), reflections.clone()]), 7))
    });

    let fused = fuse([big_book.clone(), reflections.clone()], 7);
    c.bench_function("format_citations", |b| {
        b.iter(|| format_citations(black_box(&fused)))
    });
    c.bench_function("create_llm_prompt", |b| {
        b.iter(|| {
            create_llm_prompt(
                black_box("What does the Big Book say about resentment in step 4?"),
                black_box(&fused),
                black_box(&history),
                None,
            )
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
