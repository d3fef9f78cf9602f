use std::collections::HashSet;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::LayoutGraph;

fn fuzzy_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Fuzzy-matches `query` against node names and labels. An empty or
/// whitespace query matches nothing.
pub fn search_nodes(graph: &LayoutGraph, query: &str) -> HashSet<usize> {
    let query = query.trim();
    if query.is_empty() {
        return HashSet::new();
    }

    let matcher = SkimMatcherV2::default();
    graph
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let text = node.label.as_deref().unwrap_or(&node.name);
            if fuzzy_score(&matcher, text, query).is_some()
                || fuzzy_score(&matcher, &node.name, query).is_some()
            {
                Some(index)
            } else {
                None
            }
        })
        .collect()
}

/// Match set memoized by query string; the host invalidates it whenever the
/// bound graph changes.
#[derive(Debug, Default)]
pub struct SearchCache {
    query: String,
    matches: HashSet<usize>,
}

impl SearchCache {
    pub fn matches(&mut self, graph: &LayoutGraph, query: &str) -> &HashSet<usize> {
        if self.query != query {
            self.query = query.to_owned();
            self.matches = search_nodes(graph, query);
        }
        &self.matches
    }

    pub fn invalidate(&mut self) {
        self.query.clear();
        self.matches.clear();
    }
}
