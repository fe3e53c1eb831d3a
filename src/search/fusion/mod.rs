
use std::collections::HashSet;

use super::SearchResult;

/// Stable sort, highest score first; equal scores keep their input order
#[inline]
pub fn sort_by_score(results: &mut [SearchResult]) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Merge per-source lists into one ranking of at most `limit` results
///
/// Lists are concatenated in the order given, so ties resolve in favour of the
/// earlier list. No per-source quota is applied.
#[inline]
pub fn fuse<I>(lists: I, limit: usize) -> Vec<SearchResult>
where
    I: IntoIterator<Item = Vec<SearchResult>>,
{
    let mut combined: Vec<SearchResult> = lists.into_iter().flatten().collect();
    sort_by_score(&mut combined);
    combined.truncate(limit);
    combined
}

/// Keep the first result for each page number
///
/// Results without a page number are all kept.
#[inline]
pub fn dedupe_by_page(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|result| result.page_number().is_none_or(|page| seen.insert(page)))
        .collect()
}
