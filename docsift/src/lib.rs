//! # Docsift
//!
//! Keyword search over the PDF documents linked from a listing page, by
//! default the CDSCO Subject Expert Committee index.
//!
//! A search runs in three stages:
//!
//! - **Discovery**: fetch the listing page and collect links to the download endpoint
//! - **Extraction**: download each PDF and turn it into text, falling back from
//!   `pdf-extract` to `lopdf` to OCR
//! - **Search**: count case-insensitive occurrences of the keyword and cut
//!   context snippets around the first few
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docsift::prelude::*;
//!
//! # async fn run() -> docsift::errors::Result<()> {
//! let pipeline = SearchPipeline::new(DocsiftConfig::default())?;
//! let report = pipeline.search("clinical trial").await?;
//!
//! for found in &report.results {
//!     println!("{} ({} matches)", found.document.title, found.occurrence_count);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod search;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{
        DiscoveryConfig, DocsiftConfig, ExtractionConfig, FetchConfig, OcrConfig,
        RateLimitConfig, SearchConfig,
    };
    pub use crate::discovery::LinkDiscoverer;
    pub use crate::errors::{DiscoveryError, DocsiftError, ExtractionError, FetchError};
    pub use crate::extract::{ExtractionStrategy, TextExtractor};
    pub use crate::fetch::{FetchResult, Fetcher, HttpFetcher, RateLimiter};
    pub use crate::models::{
        DocumentFailure, DocumentRef, ExtractedText, FailureStage, ResultSet, SearchMatch,
        SearchReport, Snippet,
    };
    pub use crate::observability::init_tracing;
    pub use crate::pipeline::{
        DocumentStatus, LoggingSearchObserver, NoOpSearchObserver, SearchObserver,
        SearchPipeline, SearchProgress,
    };
    pub use crate::search::{KeywordHits, KeywordMatcher};
}
