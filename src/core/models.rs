use serde::{Deserialize, Serialize};

use crate::errors::ResearchError;

/// Minimum character count for a snippet to be considered evidence.
pub const MIN_SNIPPET_CHARS: usize = 50;

/// Number of snippets joined into the completion context.
pub const MAX_CONTEXT_SNIPPETS: usize = 5;

/// Terms that mark a fragment as page chrome rather than content.
pub const BOILERPLATE_TERMS: [&str; 3] = ["javascript", "cookies", "browser"];

pub const SUMMARY_SOURCE: &str = "Web search and AI analysis";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationQuery {
    pub raw: String,
    pub normalized: String,
}

impl OrganizationQuery {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            normalized: crate::research::normalize::normalize(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSnippet {
    pub text: String,
    pub query: String,
    pub length: usize,
}

impl SearchSnippet {
    #[must_use]
    pub fn new(text: impl Into<String>, query: impl Into<String>) -> Self {
        let text = text.into();
        let length = text.chars().count();
        Self {
            text,
            query: query.into(),
            length,
        }
    }

    /// Long enough and free of boilerplate markers.
    #[must_use]
    pub fn is_candidate(&self) -> bool {
        if self.length <= MIN_SNIPPET_CHARS {
            return false;
        }
        let lowered = self.text.to_lowercase();
        !BOILERPLATE_TERMS.iter().any(|term| lowered.contains(term))
    }
}

/// Insertion-ordered snippets with substring-based near-duplicate suppression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetSet {
    snippets: Vec<SearchSnippet>,
}

impl SnippetSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding one page of text that skips the candidate filters.
    #[must_use]
    pub fn single(snippet: SearchSnippet) -> Self {
        Self {
            snippets: vec![snippet],
        }
    }

    /// Adds the snippet if it qualifies and does not overlap an existing member.
    /// Returns whether it was kept.
    pub fn push(&mut self, snippet: SearchSnippet) -> bool {
        if !snippet.is_candidate() || self.overlaps(&snippet.text) {
            return false;
        }
        self.snippets.push(snippet);
        true
    }

    fn overlaps(&self, text: &str) -> bool {
        self.snippets
            .iter()
            .any(|kept| kept.text.contains(text) || text.contains(kept.text.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchSnippet> {
        self.snippets.iter()
    }

    /// First `MAX_CONTEXT_SNIPPETS` texts separated by blank lines.
    #[must_use]
    pub fn context(&self) -> String {
        self.snippets
            .iter()
            .take(MAX_CONTEXT_SNIPPETS)
            .map(|snippet| snippet.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl FromIterator<SearchSnippet> for SnippetSet {
    fn from_iter<I: IntoIterator<Item = SearchSnippet>>(iter: I) -> Self {
        let mut set = SnippetSet::new();
        for snippet in iter {
            set.push(snippet);
        }
        set
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOutcome {
    pub success: bool,
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SummaryOutcome {
    #[must_use]
    pub fn generated(summary: &str) -> Self {
        Self {
            success: true,
            summary: summary.trim().to_string(),
            source: SUMMARY_SOURCE.to_string(),
            error: None,
        }
    }

    /// Input turned away before any research ran.
    #[must_use]
    pub fn rejected(error: &ResearchError) -> Self {
        Self {
            success: false,
            summary: error.to_string(),
            source: String::new(),
            error: Some(error.to_string()),
        }
    }

    #[must_use]
    pub fn failed(name: &str, error: &str) -> Self {
        Self {
            success: false,
            summary: format!("Unable to generate summary for {name}. Error: {error}"),
            source: String::new(),
            error: Some(error.to_string()),
        }
    }
}
