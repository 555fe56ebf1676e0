//! Data models for discovered documents, extracted text and search results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A downloadable document found on the listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    /// Anchor text, or a positional placeholder.
    pub title: String,
    /// Absolute download URL.
    pub url: String,
    /// Identifier parsed from the link's query string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl DocumentRef {
    /// Creates a new document reference.
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            identifier: None,
        }
    }

    /// Sets the identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Placeholder title for an anchor without visible text.
    #[must_use]
    pub fn placeholder_title(position: usize) -> String {
        format!("Document {position}")
    }
}

/// Text obtained from one document.
///
/// `EmptyDocument` and `Failed` both mean "nothing to search"; they are kept
/// apart for diagnostics only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractedText {
    /// Normalized text and the strategy that produced it.
    Text {
        /// Whitespace-normalized text.
        text: String,
        /// Name of the successful strategy.
        strategy: String,
    },
    /// At least one strategy completed, none produced text.
    EmptyDocument,
    /// Every strategy raised.
    Failed {
        /// One message per failed strategy, in attempt order.
        reasons: Vec<String>,
    },
}

impl ExtractedText {
    /// Returns the text if any was obtained.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::EmptyDocument | Self::Failed { .. } => None,
        }
    }

    /// Returns the name of the strategy that produced the text.
    #[must_use]
    pub fn strategy(&self) -> Option<&str> {
        match self {
            Self::Text { strategy, .. } => Some(strategy),
            Self::EmptyDocument | Self::Failed { .. } => None,
        }
    }

    /// Whether text was obtained.
    #[must_use]
    pub fn has_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }
}

/// Context around one keyword occurrence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snippet {
    /// Window text, newlines replaced by spaces and trimmed.
    pub text: String,
    /// Byte offset of the window start in the extracted text.
    pub start: usize,
    /// Byte offset one past the window end in the extracted text.
    pub end: usize,
}

/// A document containing the keyword.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchMatch {
    /// The matching document.
    pub document: DocumentRef,
    /// Number of non-overlapping occurrences (always at least 1).
    pub occurrence_count: usize,
    /// Context for the first few occurrences.
    pub snippets: Vec<Snippet>,
    /// Extraction strategy that produced the searched text.
    pub strategy: String,
}

/// Search matches ordered by occurrence count, descending.
///
/// Equal counts keep the order in which the matches were supplied, which is
/// discovery order when built by the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ResultSet(Vec<SearchMatch>);

impl ResultSet {
    /// Sorts matches by count, descending. The sort is stable.
    #[must_use]
    pub fn from_matches(mut matches: Vec<SearchMatch>) -> Self {
        matches.sort_by(|a, b| b.occurrence_count.cmp(&a.occurrence_count));
        Self(matches)
    }

    /// Number of matching documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over matches in result order.
    pub fn iter(&self) -> std::slice::Iter<'_, SearchMatch> {
        self.0.iter()
    }

    /// Returns the matches as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[SearchMatch] {
        &self.0
    }

    /// Unwraps the ordered matches.
    #[must_use]
    pub fn into_vec(self) -> Vec<SearchMatch> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a SearchMatch;
    type IntoIter = std::slice::Iter<'a, SearchMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Where processing of a document stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Network error or non-success status.
    Fetch,
    /// Body was not a PDF.
    NotPdf,
    /// Every extraction strategy raised.
    Extraction,
    /// The per-document timeout expired.
    Timeout,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fetch => "fetch",
            Self::NotPdf => "not_pdf",
            Self::Extraction => "extraction",
            Self::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

/// Record of a document that could not be searched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentFailure {
    /// The affected document.
    pub document: DocumentRef,
    /// Stage that failed.
    pub stage: FailureStage,
    /// Human-readable reason.
    pub message: String,
    /// When the failure was recorded.
    pub occurred_at: DateTime<Utc>,
}

impl DocumentFailure {
    /// Creates a new failure record.
    #[must_use]
    pub fn new(document: DocumentRef, stage: FailureStage, message: impl Into<String>) -> Self {
        Self {
            document,
            stage,
            message: message.into(),
            occurred_at: Utc::now(),
        }
    }
}

/// Outcome of one search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Trimmed keyword that was searched for.
    pub keyword: String,
    /// Start of the run.
    pub started_at: DateTime<Utc>,
    /// Documents selected for searching.
    pub documents_total: usize,
    /// Documents fully processed (matched, unmatched, empty or failed).
    pub documents_processed: usize,
    /// Matching documents, best first.
    pub results: ResultSet,
    /// Documents that could not be searched.
    pub failures: Vec<DocumentFailure>,
    /// Documents that yielded no text.
    pub empty_documents: Vec<DocumentRef>,
    /// Whether the run was cancelled before every document was processed.
    pub cancelled: bool,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: f64,
}

impl SearchReport {
    /// Creates an empty report for a run over `documents_total` documents.
    #[must_use]
    pub fn new(keyword: impl Into<String>, documents_total: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            keyword: keyword.into(),
            started_at: Utc::now(),
            documents_total,
            documents_processed: 0,
            results: ResultSet::default(),
            failures: Vec::new(),
            empty_documents: Vec::new(),
            cancelled: false,
            duration_ms: 0.0,
        }
    }

    /// Whether any document matched.
    #[must_use]
    pub fn has_matches(&self) -> bool {
        !self.results.is_empty()
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
