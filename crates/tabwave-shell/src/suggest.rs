//! Omnibox suggestions from bookmarks and global history.

use crate::state::BrowserState;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    Bookmark,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub url: String,
    pub source: SuggestionSource,
    pub score: i64,
}

/// Up to `limit` urls matching `query`, best first.
///
/// Each url appears once; a bookmarked url is reported as a bookmark even
/// if history scores it higher. Ties keep bookmark order, then recency.
pub fn suggest(state: &BrowserState, query: &str, limit: usize) -> Vec<Suggestion> {
    let query = query.trim();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    let candidates = state
        .bookmarks
        .iter()
        .map(|url| (url.as_str(), SuggestionSource::Bookmark))
        .chain(
            state
                .history
                .iter()
                .map(|entry| (entry.url.as_str(), SuggestionSource::History)),
        );

    for (url, source) in candidates {
        if !seen.insert(url) {
            continue;
        }
        if let Some(score) = matcher.fuzzy_match(url, query) {
            results.push(Suggestion {
                url: url.to_string(),
                source,
                score,
            });
        }
    }

    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(limit);
    results
}
