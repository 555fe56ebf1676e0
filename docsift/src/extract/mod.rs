//! PDF text extraction with ordered fallback strategies.
//!
//! [`TextExtractor`] runs its strategies in priority order and stops at the
//! first one that yields non-empty text:
//!
//! 1. `pdf-extract` text layer
//! 2. `lopdf` text layer, page by page
//! 3. OCR through `pdftoppm` and `tesseract` (feature `ocr`)
//!
//! A strategy error is logged and the next strategy is tried. The outcome is
//! an [`ExtractedText`], which tells "no strategy produced text" apart from
//! "every strategy failed".

#[cfg(feature = "ocr")]
mod ocr;
mod text_layer;

#[cfg(feature = "ocr")]
pub use ocr::OcrStrategy;
pub use text_layer::{LopdfStrategy, PdfExtractStrategy};

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ExtractionConfig;
use crate::errors::ExtractionError;
use crate::models::ExtractedText;

/// Magic bytes every PDF starts with.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Whether `bytes` start with the PDF header.
#[must_use]
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

/// Collapses whitespace runs (newlines included) to single spaces and trims.
#[must_use]
pub fn normalize_page(page: &str) -> String {
    page.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes every page and joins the non-empty ones with a single space.
#[must_use]
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|page| normalize_page(page.as_ref()))
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One way of turning PDF bytes into per-page text.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync + Debug {
    /// Short name reported in results and logs.
    fn name(&self) -> &str;

    /// Extracts raw text per page. An empty result means the strategy ran
    /// but found no text.
    async fn extract_pages(&self, pdf: Arc<[u8]>) -> Result<Vec<String>, ExtractionError>;
}

/// Runs extraction strategies in priority order.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    strategies: Vec<Arc<dyn ExtractionStrategy>>,
}

impl TextExtractor {
    /// Creates an extractor over explicit strategies, highest priority first.
    #[must_use]
    pub fn new(strategies: Vec<Arc<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Builds the default chain: `pdf-extract`, `lopdf`, then OCR when enabled.
    #[must_use]
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let timeout = config.strategy_timeout();
        #[cfg_attr(not(feature = "ocr"), allow(unused_mut))]
        let mut strategies: Vec<Arc<dyn ExtractionStrategy>> = vec![
            Arc::new(PdfExtractStrategy::new(timeout)),
            Arc::new(LopdfStrategy::new(timeout)),
        ];

        #[cfg(feature = "ocr")]
        if config.enable_ocr {
            strategies.push(Arc::new(OcrStrategy::new(config.ocr.clone())));
        }
        #[cfg(not(feature = "ocr"))]
        if config.enable_ocr {
            debug!("OCR requested but docsift was built without the `ocr` feature");
        }

        Self::new(strategies)
    }

    /// Names of the configured strategies, in attempt order.
    #[must_use]
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Extracts text from `pdf`, short-circuiting on the first strategy with text.
    ///
    /// Bytes without the PDF header are rejected before any strategy runs.
    pub async fn extract(&self, pdf: Arc<[u8]>) -> ExtractedText {
        if !looks_like_pdf(&pdf) {
            return ExtractedText::Failed {
                reasons: vec!["content does not start with %PDF-".to_string()],
            };
        }

        let mut reasons = Vec::new();
        let mut completed = false;

        for strategy in &self.strategies {
            let name = strategy.name();
            debug!(strategy = name, bytes = pdf.len(), "trying extraction strategy");

            match strategy.extract_pages(Arc::clone(&pdf)).await {
                Ok(pages) => {
                    let text = join_pages(&pages);
                    if !text.is_empty() {
                        debug!(strategy = name, chars = text.len(), "extracted text");
                        return ExtractedText::Text {
                            text,
                            strategy: name.to_string(),
                        };
                    }
                    debug!(strategy = name, pages = pages.len(), "strategy found no text");
                    completed = true;
                }
                Err(e) => {
                    warn!(strategy = name, error = %e, "extraction strategy failed");
                    reasons.push(e.to_string());
                }
            }
        }

        if completed {
            ExtractedText::EmptyDocument
        } else {
            ExtractedText::Failed { reasons }
        }
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}
