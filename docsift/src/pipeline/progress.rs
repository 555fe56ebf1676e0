//! Progress accounting for a search run.

use serde::{Deserialize, Serialize};

use super::DocumentStatus;

/// Running totals of processed documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchProgress {
    /// Documents finished so far.
    pub completed: usize,
    /// Documents selected for the run.
    pub total: usize,
    /// Title of the most recently finished document.
    pub current_title: Option<String>,
    /// Documents containing the keyword.
    pub matched: usize,
    /// Documents searched without a match.
    pub unmatched: usize,
    /// Documents that yielded no text.
    pub no_text: usize,
    /// Documents that failed.
    pub failed: usize,
}

impl SearchProgress {
    /// Creates a tracker for `total` documents.
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Returns the completion percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }

    /// Whether every document has been processed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }

    /// Records one finished document.
    pub fn record(&mut self, title: &str, status: &DocumentStatus) {
        self.completed += 1;
        self.current_title = Some(title.to_string());
        match status {
            DocumentStatus::Matched { .. } => self.matched += 1,
            DocumentStatus::NoMatch => self.unmatched += 1,
            DocumentStatus::NoText => self.no_text += 1,
            DocumentStatus::Failed(_) => self.failed += 1,
        }
    }
}
