//! Progress bar for interactive runs.

use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;

use docsift::models::{DocumentRef, SearchReport};
use docsift::pipeline::{DocumentStatus, SearchObserver, SearchProgress};

const TEMPLATE: &str = "{spinner:.cyan} {prefix:<10} [{bar:40.cyan/dim}] {pos}/{len} {msg}";

/// Observer that drives an `indicatif` bar on stderr.
pub struct ProgressObserver {
    bar: ProgressBar,
    progress: Mutex<SearchProgress>,
}

impl ProgressObserver {
    /// A visible bar, or a hidden one for `--json` and piped output.
    pub fn new(visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("━━╸"));
        }
        bar.set_prefix("Searching");

        Self {
            bar,
            progress: Mutex::new(SearchProgress::default()),
        }
    }

    fn summary(progress: &SearchProgress) -> String {
        let mut summary = format!("{} matched", progress.matched);
        if progress.failed > 0 {
            summary.push_str(&format!(", {} failed", progress.failed));
        }
        summary
    }
}

impl SearchObserver for ProgressObserver {
    fn on_discovery_complete(&self, documents: &[DocumentRef]) {
        *self.progress.lock() = SearchProgress::new(documents.len());
        self.bar.set_length(documents.len() as u64);
        self.bar
            .println(format!("Searching in {} documents...", documents.len()));
    }

    fn on_document_start(&self, _index: usize, _total: usize, _document: &DocumentRef) {}

    fn on_document_complete(
        &self,
        _index: usize,
        _total: usize,
        document: &DocumentRef,
        status: &DocumentStatus,
    ) {
        let message = {
            let mut progress = self.progress.lock();
            progress.record(&document.title, status);
            Self::summary(&progress)
        };
        self.bar.inc(1);
        self.bar.set_message(message);
    }

    fn on_search_complete(&self, _report: &SearchReport) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift::models::FailureStage;

    #[test]
    fn test_hidden_bar_tracks_progress() {
        let observer = ProgressObserver::new(false);
        let documents = vec![
            DocumentRef::new("A", "https://example.com/a"),
            DocumentRef::new("B", "https://example.com/b"),
        ];

        observer.on_discovery_complete(&documents);
        observer.on_document_complete(0, 2, &documents[0], &DocumentStatus::Matched { count: 2 });
        observer.on_document_complete(
            1,
            2,
            &documents[1],
            &DocumentStatus::Failed(FailureStage::Fetch),
        );

        assert_eq!(observer.bar.position(), 2);
        assert_eq!(observer.bar.length(), Some(2));
        assert_eq!(observer.bar.message(), "1 matched, 1 failed");
        assert!(observer.progress.lock().is_complete());
    }
}
