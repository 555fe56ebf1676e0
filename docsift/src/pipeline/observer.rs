//! Per-document status and run observers.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::SearchProgress;
use crate::models::{DocumentRef, FailureStage, SearchReport};

/// How processing of one document ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// The keyword occurred `count` times.
    Matched {
        /// Occurrence count.
        count: usize,
    },
    /// Text was searched, the keyword did not occur.
    NoMatch,
    /// No extraction strategy produced text.
    NoText,
    /// The document could not be searched.
    Failed(FailureStage),
}

impl DocumentStatus {
    /// Short label for logs and progress output.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Matched { .. } => "matched",
            Self::NoMatch => "no_match",
            Self::NoText => "no_text",
            Self::Failed(_) => "failed",
        }
    }
}

/// Observability callbacks for a search run.
pub trait SearchObserver: Send + Sync {
    /// Called once the document list is known.
    fn on_discovery_complete(&self, documents: &[DocumentRef]);

    /// Called when work on a document starts. `index` is 0-based.
    fn on_document_start(&self, index: usize, total: usize, document: &DocumentRef);

    /// Called when a document is finished, in discovery order.
    fn on_document_complete(
        &self,
        index: usize,
        total: usize,
        document: &DocumentRef,
        status: &DocumentStatus,
    );

    /// Called with the final (possibly partial) report.
    fn on_search_complete(&self, report: &SearchReport);
}

/// No-op implementation of [`SearchObserver`].
#[derive(Debug, Clone, Default)]
pub struct NoOpSearchObserver;

impl SearchObserver for NoOpSearchObserver {
    fn on_discovery_complete(&self, _documents: &[DocumentRef]) {}
    fn on_document_start(&self, _index: usize, _total: usize, _document: &DocumentRef) {}
    fn on_document_complete(
        &self,
        _index: usize,
        _total: usize,
        _document: &DocumentRef,
        _status: &DocumentStatus,
    ) {
    }
    fn on_search_complete(&self, _report: &SearchReport) {}
}

/// Reports progress through `tracing`.
#[derive(Debug, Default)]
pub struct LoggingSearchObserver {
    progress: Mutex<SearchProgress>,
}

impl LoggingSearchObserver {
    /// Creates a logging observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the progress seen so far.
    #[must_use]
    pub fn progress(&self) -> SearchProgress {
        self.progress.lock().clone()
    }
}

impl SearchObserver for LoggingSearchObserver {
    fn on_discovery_complete(&self, documents: &[DocumentRef]) {
        *self.progress.lock() = SearchProgress::new(documents.len());
        info!(documents = documents.len(), "Discovery complete");
    }

    fn on_document_start(&self, index: usize, total: usize, document: &DocumentRef) {
        debug!(
            position = index + 1,
            total,
            title = %document.title,
            url = %document.url,
            "Processing document"
        );
    }

    fn on_document_complete(
        &self,
        index: usize,
        total: usize,
        document: &DocumentRef,
        status: &DocumentStatus,
    ) {
        let percent = {
            let mut progress = self.progress.lock();
            progress.record(&document.title, status);
            progress.percent()
        };
        info!(
            position = index + 1,
            total,
            percent,
            title = %document.title,
            status = status.label(),
            "Document processed"
        );
    }

    fn on_search_complete(&self, report: &SearchReport) {
        info!(
            run_id = %report.run_id,
            matches = report.results.len(),
            failures = report.failures.len(),
            processed = report.documents_processed,
            total = report.documents_total,
            cancelled = report.cancelled,
            duration_ms = report.duration_ms,
            "Search complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(DocumentStatus::Matched { count: 1 }.label(), "matched");
        assert_eq!(DocumentStatus::NoText.label(), "no_text");
        assert_eq!(DocumentStatus::Failed(FailureStage::Timeout).label(), "failed");
    }

    #[test]
    fn test_logging_observer_tracks_progress() {
        let observer = LoggingSearchObserver::new();
        let docs = vec![
            DocumentRef::new("a", "https://example.com/a"),
            DocumentRef::new("b", "https://example.com/b"),
        ];

        observer.on_discovery_complete(&docs);
        observer.on_document_start(0, 2, &docs[0]);
        observer.on_document_complete(0, 2, &docs[0], &DocumentStatus::Matched { count: 3 });

        let progress = observer.progress();
        assert_eq!(progress.total, 2);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.matched, 1);
    }

    #[test]
    fn test_noop_observer() {
        let observer = NoOpSearchObserver;
        observer.on_discovery_complete(&[]);
        observer.on_search_complete(&SearchReport::new("x", 0));
    }
}
