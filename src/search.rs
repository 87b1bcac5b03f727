//! Keyword cross-search over cached experience sections.
//!
//! A comma-separated user input becomes a [`SearchQuery`] of lowercase
//! trimmed keywords; matching is case-insensitive substring containment
//! against each document's cached experience section. Documents without
//! a section match nothing, which is a rendered state, not an error.

use serde::Serialize;

use crate::session::SessionStore;

/// Keywords parsed from a comma-separated input: lowercased, trimmed,
/// empties discarded, input order preserved. Duplicates are tolerated;
/// matching is idempotent per keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    keywords: Vec<String>,
}

impl SearchQuery {
    pub fn parse(input: &str) -> Self {
        let keywords = input
            .split(',')
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Keywords from the query that occur in `text`, case-insensitively, in
/// input order, deduplicated. Empty result means no match.
pub fn match_keywords(text: &str, query: &SearchQuery) -> Vec<String> {
    let haystack = text.to_lowercase();
    let mut matched: Vec<String> = Vec::new();
    for keyword in &query.keywords {
        if matched.iter().any(|m| m == keyword) {
            continue;
        }
        if haystack.contains(keyword.as_str()) {
            matched.push(keyword.clone());
        }
    }
    matched
}

/// Per-document keyword match summary.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMatches {
    pub document_id: String,
    pub name: String,
    /// False when segmentation found no experience section; `matched`
    /// is then necessarily empty.
    pub section_found: bool,
    pub matched: Vec<String>,
    pub unmatched: Vec<String>,
}

/// Evaluate a query against every document cached in the session.
pub fn search_session(store: &SessionStore, query: &SearchQuery) -> Vec<DocumentMatches> {
    store
        .list()
        .into_iter()
        .map(|entry| {
            let matched = match &entry.section {
                Some(section) => match_keywords(&section.text, query),
                None => Vec::new(),
            };
            let mut unmatched: Vec<String> = Vec::new();
            for keyword in query.keywords() {
                if !matched.iter().any(|m| m == keyword)
                    && !unmatched.iter().any(|u| u == keyword)
                {
                    unmatched.push(keyword.clone());
                }
            }
            DocumentMatches {
                document_id: entry.document.id.clone(),
                name: entry.document.name.clone(),
                section_found: entry.section.is_some(),
                matched,
                unmatched,
            }
        })
        .collect()
}
