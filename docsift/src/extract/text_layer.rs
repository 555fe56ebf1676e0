//! Text-layer strategies backed by `pdf-extract` and `lopdf`.
//!
//! Both libraries are synchronous and may panic on malformed input, so they
//! run on the blocking pool under a timeout.

use async_trait::async_trait;
use lopdf::Document;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::ExtractionStrategy;
use crate::errors::ExtractionError;

async fn run_blocking<F>(
    strategy: &str,
    timeout: Duration,
    work: F,
) -> Result<Vec<String>, ExtractionError>
where
    F: FnOnce() -> Result<Vec<String>, String> + Send + 'static,
{
    // On timeout the blocking task is detached and finishes in the background.
    let handle = tokio::task::spawn_blocking(work);
    match tokio::time::timeout(timeout, handle).await {
        Err(_) => Err(ExtractionError::Timeout {
            strategy: strategy.to_string(),
            seconds: timeout.as_secs_f64(),
        }),
        Ok(Err(join)) if join.is_panic() => Err(ExtractionError::Panicked {
            strategy: strategy.to_string(),
        }),
        Ok(Err(join)) => Err(ExtractionError::Parse {
            strategy: strategy.to_string(),
            message: join.to_string(),
        }),
        Ok(Ok(Err(message))) => Err(ExtractionError::Parse {
            strategy: strategy.to_string(),
            message,
        }),
        Ok(Ok(Ok(pages))) => Ok(pages),
    }
}

/// Strategy A: page-by-page text through `pdf-extract`.
#[derive(Debug, Clone)]
pub struct PdfExtractStrategy {
    timeout: Duration,
}

impl PdfExtractStrategy {
    /// Creates the strategy with a per-document timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ExtractionStrategy for PdfExtractStrategy {
    fn name(&self) -> &str {
        "pdf-extract"
    }

    async fn extract_pages(&self, pdf: Arc<[u8]>) -> Result<Vec<String>, ExtractionError> {
        run_blocking(self.name(), self.timeout, move || {
            pdf_extract::extract_text_from_mem_by_pages(&pdf).map_err(|e| e.to_string())
        })
        .await
    }
}

/// Strategy B: page-by-page text through `lopdf`.
///
/// A page whose content cannot be decoded is skipped; the rest of the
/// document is still returned.
#[derive(Debug, Clone)]
pub struct LopdfStrategy {
    timeout: Duration,
}

impl LopdfStrategy {
    /// Creates the strategy with a per-document timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

fn lopdf_pages(pdf: &[u8]) -> Result<Vec<String>, String> {
    let doc = Document::load_mem(pdf).map_err(|e| e.to_string())?;
    let pages = doc.get_pages();

    let mut texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => texts.push(text),
            Err(e) => debug!(page = page_number, error = %e, "skipping unreadable page"),
        }
    }
    Ok(texts)
}

#[async_trait]
impl ExtractionStrategy for LopdfStrategy {
    fn name(&self) -> &str {
        "lopdf"
    }

    async fn extract_pages(&self, pdf: Arc<[u8]>) -> Result<Vec<String>, ExtractionError> {
        run_blocking(self.name(), self.timeout, move || lopdf_pages(&pdf)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::pdf_with_pages;

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn test_lopdf_reads_pages_in_order() {
        let pdf: Arc<[u8]> = Arc::from(pdf_with_pages(&["Alpha page", "Beta page"]));

        let pages = LopdfStrategy::new(TIMEOUT).extract_pages(pdf).await.unwrap();

        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("Alpha"));
        assert!(pages[1].contains("Beta"));
    }

    #[tokio::test]
    async fn test_pdf_extract_splits_pages() {
        let pdf: Arc<[u8]> = Arc::from(pdf_with_pages(&["Alpha page", "Beta page"]));

        // pdf-extract may reject the fixture's minimal font dictionaries.
        if let Ok(pages) = PdfExtractStrategy::new(TIMEOUT).extract_pages(pdf).await {
            assert_eq!(pages.len(), 2);
            assert!(pages[0].contains("Alpha"));
            assert!(pages[1].contains("Beta"));
        }
    }

    #[tokio::test]
    async fn test_garbage_yields_no_text() {
        let pdf: Arc<[u8]> = Arc::from(&b"%PDF-1.4 this is not a real document"[..]);

        for strategy in [
            Box::new(PdfExtractStrategy::new(TIMEOUT)) as Box<dyn ExtractionStrategy>,
            Box::new(LopdfStrategy::new(TIMEOUT)),
        ] {
            match strategy.extract_pages(Arc::clone(&pdf)).await {
                Ok(pages) => assert!(pages.iter().all(|p| p.trim().is_empty())),
                Err(e) => assert_eq!(e.strategy(), strategy.name()),
            }
        }
    }

    #[tokio::test]
    async fn test_panic_is_reported() {
        let err = run_blocking("stub", TIMEOUT, || panic!("parser bug")).await.unwrap_err();
        assert_eq!(
            err,
            ExtractionError::Panicked {
                strategy: "stub".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let err = run_blocking("stub", Duration::from_millis(20), || {
            std::thread::sleep(Duration::from_millis(500));
            Ok(Vec::new())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ExtractionError::Timeout { .. }));
    }
}
