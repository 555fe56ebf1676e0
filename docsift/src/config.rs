//! Configuration types for discovery, fetching, extraction and search.
//!
//! Every section deserializes with defaults, so a TOML file only needs the
//! keys it wants to change:
//!
//! ```toml
//! max_concurrent = 3
//!
//! [discovery]
//! max_documents = 10
//!
//! [extraction.ocr]
//! language = "eng+hin"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{DocsiftError, Result};
use crate::fetch::MAX_INTERVAL;

/// Default listing page: the CDSCO Subject Expert Committee index.
pub const DEFAULT_LISTING_URL: &str = "https://cdsco.gov.in/opencms/opencms/en/Committees/SEC/";

/// Substring identifying the CDSCO download endpoint.
pub const DEFAULT_LINK_MARKER: &str = "common_download.jsp";

/// Configuration for link discovery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveryConfig {
    /// Listing page to scan for document links.
    #[serde(default = "default_listing_url")]
    pub listing_url: String,
    /// Substring an anchor's resolved target must contain.
    #[serde(default = "default_link_marker")]
    pub link_marker: String,
    /// Maximum number of documents to search.
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,
    /// Query parameter holding the document identifier.
    #[serde(default = "default_id_param")]
    pub id_param: Option<String>,
    /// Template for rebuilding download URLs from the identifier (`{id}`).
    #[serde(default)]
    pub download_url_template: Option<String>,
}

fn default_listing_url() -> String {
    DEFAULT_LISTING_URL.to_string()
}

fn default_link_marker() -> String {
    DEFAULT_LINK_MARKER.to_string()
}

fn default_max_documents() -> usize {
    50
}

#[allow(clippy::unnecessary_wraps)]
fn default_id_param() -> Option<String> {
    Some("num_id".to_string())
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
            link_marker: default_link_marker(),
            max_documents: default_max_documents(),
            id_param: default_id_param(),
            download_url_template: None,
        }
    }
}

impl DiscoveryConfig {
    /// Creates a new discovery configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the listing URL.
    #[must_use]
    pub fn with_listing_url(mut self, url: impl Into<String>) -> Self {
        self.listing_url = url.into();
        self
    }

    /// Sets the download endpoint marker.
    #[must_use]
    pub fn with_link_marker(mut self, marker: impl Into<String>) -> Self {
        self.link_marker = marker.into();
        self
    }

    /// Sets the maximum number of documents.
    #[must_use]
    pub fn with_max_documents(mut self, max: usize) -> Self {
        self.max_documents = max;
        self
    }

    /// Sets the download URL template.
    #[must_use]
    pub fn with_download_url_template(mut self, template: impl Into<String>) -> Self {
        self.download_url_template = Some(template.into());
        self
    }
}

/// HTTP settings shared by the listing page and document downloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds, body included.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// Redirect hops followed before giving up.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// User agent string. The source site rejects default client identifiers.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Bodies larger than this many bytes are abandoned.
    #[serde(default = "default_max_size")]
    pub max_response_size: usize,
    /// Extra request headers, e.g. `Accept-Language`.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_timeout() -> f64 {
    20.0
}

fn default_max_redirects() -> usize {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36"
        .to_string()
}

fn default_max_size() -> usize {
    50 * 1024 * 1024
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
            max_response_size: default_max_size(),
            headers: HashMap::new(),
        }
    }
}

impl FetchConfig {
    /// Defaults: 20s timeout, browser user agent, 50 MiB body cap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds an extra request header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// The request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        seconds(self.timeout_seconds)
    }
}

/// Configuration for the OCR fallback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrConfig {
    /// Rasterization resolution passed to `pdftoppm`.
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Tesseract language code.
    #[serde(default = "default_language")]
    pub language: String,
    /// Maximum number of pages to rasterize.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Timeout for the whole OCR pass of one document.
    #[serde(default = "default_ocr_timeout")]
    pub timeout_seconds: f64,
    /// `pdftoppm` executable.
    #[serde(default = "default_pdftoppm")]
    pub pdftoppm_path: String,
    /// `tesseract` executable.
    #[serde(default = "default_tesseract")]
    pub tesseract_path: String,
    /// Parent of the per-document scratch directory (system temp dir if unset).
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

fn default_dpi() -> u32 {
    300
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_max_pages() -> u32 {
    50
}

fn default_ocr_timeout() -> f64 {
    300.0
}

fn default_pdftoppm() -> String {
    "pdftoppm".to_string()
}

fn default_tesseract() -> String {
    "tesseract".to_string()
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            language: default_language(),
            max_pages: default_max_pages(),
            timeout_seconds: default_ocr_timeout(),
            pdftoppm_path: default_pdftoppm(),
            tesseract_path: default_tesseract(),
            scratch_dir: None,
        }
    }
}

impl OcrConfig {
    /// Budget for rasterizing and recognizing one document.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        seconds(self.timeout_seconds)
    }
}

/// Configuration for text extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionConfig {
    /// Whether the OCR fallback is attempted.
    #[serde(default = "default_true")]
    pub enable_ocr: bool,
    /// Timeout for each text-layer strategy.
    #[serde(default = "default_timeout")]
    pub strategy_timeout_seconds: f64,
    /// OCR settings.
    #[serde(default)]
    pub ocr: OcrConfig,
}

fn default_true() -> bool {
    true
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            enable_ocr: true,
            strategy_timeout_seconds: default_timeout(),
            ocr: OcrConfig::default(),
        }
    }
}

impl ExtractionConfig {
    /// Creates a new extraction configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables the OCR fallback.
    #[must_use]
    pub fn without_ocr(mut self) -> Self {
        self.enable_ocr = false;
        self
    }

    /// Gets the text-layer strategy timeout as Duration.
    #[must_use]
    pub fn strategy_timeout(&self) -> Duration {
        seconds(self.strategy_timeout_seconds)
    }
}

/// Configuration for keyword matching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchConfig {
    /// Characters of context on each side of a match.
    #[serde(default = "default_snippet_window")]
    pub snippet_window: usize,
    /// Maximum snippets per document.
    #[serde(default = "default_max_snippets")]
    pub max_snippets: usize,
}

fn default_snippet_window() -> usize {
    30
}

fn default_max_snippets() -> usize {
    3
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            snippet_window: default_snippet_window(),
            max_snippets: default_max_snippets(),
        }
    }
}

/// Token bucket settings shared by every outbound request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateLimitConfig {
    /// Sustained request rate.
    #[serde(default = "default_rps")]
    pub requests_per_second: f64,
    /// Bucket capacity.
    #[serde(default = "default_burst")]
    pub burst: u32,
}

fn default_rps() -> f64 {
    1.0
}

fn default_burst() -> u32 {
    1
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rps(),
            burst: default_burst(),
        }
    }
}

/// Upper bound on concurrent document workers.
pub const MAX_CONCURRENCY: usize = 4;

/// Combined configuration for a search run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocsiftConfig {
    /// Maximum documents processed concurrently.
    #[serde(default = "default_concurrent")]
    pub max_concurrent: usize,
    /// Timeout for fetching, extracting and searching one document.
    #[serde(default = "default_document_timeout")]
    pub document_timeout_seconds: f64,
    /// Debug-level diagnostics.
    #[serde(default)]
    pub verbose: bool,
    /// Discovery configuration.
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    /// Fetch configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Extraction configuration.
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Search configuration.
    #[serde(default)]
    pub search: SearchConfig,
    /// Rate limiting configuration.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_concurrent() -> usize {
    2
}

fn default_document_timeout() -> f64 {
    360.0
}

impl Default for DocsiftConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_concurrent(),
            document_timeout_seconds: default_document_timeout(),
            verbose: false,
            discovery: DiscoveryConfig::default(),
            fetch: FetchConfig::default(),
            extraction: ExtractionConfig::default(),
            search: SearchConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl DocsiftConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML document and validates it.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(input).map_err(|e| DocsiftError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|e| {
            DocsiftError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&input)
    }

    /// Sets the maximum concurrent documents.
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max;
        self
    }

    /// Sets the per-document timeout.
    #[must_use]
    pub fn with_document_timeout(mut self, seconds: f64) -> Self {
        self.document_timeout_seconds = seconds;
        self
    }

    /// Enables debug diagnostics.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Replaces the discovery section.
    #[must_use]
    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    /// Replaces the extraction section.
    #[must_use]
    pub fn with_extraction(mut self, extraction: ExtractionConfig) -> Self {
        self.extraction = extraction;
        self
    }

    /// Replaces the rate limit section.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Gets the per-document timeout as Duration.
    #[must_use]
    pub fn document_timeout(&self) -> Duration {
        seconds(self.document_timeout_seconds)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CONCURRENCY).contains(&self.max_concurrent) {
            return Err(DocsiftError::Config(format!(
                "max_concurrent must be between 1 and {MAX_CONCURRENCY}, got {}",
                self.max_concurrent
            )));
        }
        let rps = self.rate_limit.requests_per_second;
        if !(rps.is_finite() && rps > 0.0) {
            return Err(DocsiftError::Config(
                "rate_limit.requests_per_second must be positive".to_string(),
            ));
        }
        if rps.recip() > MAX_INTERVAL.as_secs_f64() {
            return Err(DocsiftError::Config(format!(
                "rate_limit.requests_per_second must allow one request every {}s",
                MAX_INTERVAL.as_secs()
            )));
        }
        if self.rate_limit.burst == 0 {
            return Err(DocsiftError::Config("rate_limit.burst must be at least 1".to_string()));
        }
        if self.discovery.max_documents == 0 {
            return Err(DocsiftError::Config(
                "discovery.max_documents must be at least 1".to_string(),
            ));
        }
        if self.discovery.link_marker.is_empty() {
            return Err(DocsiftError::Config("discovery.link_marker must not be empty".to_string()));
        }
        if let Some(template) = &self.discovery.download_url_template {
            if !template.contains("{id}") {
                return Err(DocsiftError::Config(
                    "discovery.download_url_template must contain '{id}'".to_string(),
                ));
            }
        }
        for (name, seconds) in [
            ("fetch.timeout_seconds", self.fetch.timeout_seconds),
            ("extraction.strategy_timeout_seconds", self.extraction.strategy_timeout_seconds),
            ("extraction.ocr.timeout_seconds", self.extraction.ocr.timeout_seconds),
            ("document_timeout_seconds", self.document_timeout_seconds),
        ] {
            if !(seconds.is_finite() && seconds > 0.0) {
                return Err(DocsiftError::Config(format!("{name} must be a positive number")));
            }
            if Duration::try_from_secs_f64(seconds).is_err() {
                return Err(DocsiftError::Config(format!(
                    "{name} is out of range, got {seconds}"
                )));
            }
        }
        Ok(())
    }
}

/// Converts validated seconds; values past `Duration::MAX` saturate.
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = DocsiftConfig::default();

        assert_eq!(config.discovery.listing_url, DEFAULT_LISTING_URL);
        assert_eq!(config.discovery.link_marker, "common_download.jsp");
        assert_eq!(config.discovery.max_documents, 50);
        assert_eq!(config.fetch.timeout_seconds, 20.0);
        assert!(config.fetch.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.search.snippet_window, 30);
        assert_eq!(config.search.max_snippets, 3);
        assert_eq!(config.rate_limit.requests_per_second, 1.0);
        assert!(config.extraction.enable_ocr);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = DocsiftConfig::new()
            .with_max_concurrent(3)
            .with_verbose(true)
            .with_discovery(DiscoveryConfig::new().with_max_documents(5))
            .with_extraction(ExtractionConfig::new().without_ocr());

        assert_eq!(config.max_concurrent, 3);
        assert!(config.verbose);
        assert_eq!(config.discovery.max_documents, 5);
        assert!(!config.extraction.enable_ocr);
    }

    #[test]
    fn test_fetch_config_builder() {
        let config = FetchConfig::new()
            .with_timeout(30.0)
            .with_user_agent("custom-agent")
            .with_header("Accept-Language", "en");

        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.user_agent, "custom-agent");
        assert_eq!(config.headers.get("Accept-Language"), Some(&"en".to_string()));
    }

    #[test]
    fn test_partial_toml() {
        let config = DocsiftConfig::from_toml_str(
            r#"
            max_concurrent = 3

            [discovery]
            max_documents = 10

            [extraction.ocr]
            language = "eng+hin"
            "#,
        )
        .unwrap();

        assert_eq!(config.max_concurrent, 3);
        assert_eq!(config.discovery.max_documents, 10);
        assert_eq!(config.discovery.link_marker, DEFAULT_LINK_MARKER);
        assert_eq!(config.extraction.ocr.language, "eng+hin");
        assert_eq!(config.extraction.ocr.dpi, 300);
    }

    #[test]
    fn test_invalid_toml() {
        let err = DocsiftConfig::from_toml_str("max_concurrent = \"many\"").unwrap_err();
        assert!(matches!(err, DocsiftError::Config(_)));
    }

    #[test]
    fn test_validate_concurrency_bounds() {
        assert!(DocsiftConfig::new().with_max_concurrent(0).validate().is_err());
        assert!(DocsiftConfig::new().with_max_concurrent(5).validate().is_err());
        assert!(DocsiftConfig::new().with_max_concurrent(4).validate().is_ok());
    }

    #[test]
    fn test_validate_rate_limit() {
        let config = DocsiftConfig::new().with_rate_limit(RateLimitConfig {
            requests_per_second: 0.0,
            burst: 1,
        });
        assert!(config.validate().is_err());

        let config = DocsiftConfig::new().with_rate_limit(RateLimitConfig {
            requests_per_second: 1e-30,
            burst: 1,
        });
        assert!(config.validate().is_err());

        let config = DocsiftConfig::new().with_rate_limit(RateLimitConfig {
            requests_per_second: 1.0 / 1800.0,
            burst: 1,
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_template_requires_placeholder() {
        let config = DocsiftConfig::new().with_discovery(
            DiscoveryConfig::new().with_download_url_template("download.jsp?num_id="),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_timeouts() {
        let config = DocsiftConfig::new().with_document_timeout(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_timeouts_are_rejected() {
        for input in [
            "[fetch]\ntimeout_seconds = 1e20",
            "[extraction]\nstrategy_timeout_seconds = 1e20",
            "[extraction.ocr]\ntimeout_seconds = 1e20",
            "document_timeout_seconds = 1e20",
        ] {
            let err = DocsiftConfig::from_toml_str(input).unwrap_err();
            assert!(err.to_string().contains("out of range"), "{input}: {err}");
        }
    }

    #[test]
    fn test_timeout_accessors_saturate() {
        let mut config = DocsiftConfig::new();
        config.fetch.timeout_seconds = 1e20;
        config.extraction.strategy_timeout_seconds = f64::INFINITY;
        config.extraction.ocr.timeout_seconds = 1e30;
        config.document_timeout_seconds = 1e20;

        assert_eq!(config.fetch.timeout(), Duration::MAX);
        assert_eq!(config.extraction.strategy_timeout(), Duration::MAX);
        assert_eq!(config.extraction.ocr.timeout(), Duration::MAX);
        assert_eq!(config.document_timeout(), Duration::MAX);
    }

    #[test]
    fn test_from_missing_file() {
        let err = DocsiftConfig::from_file("/nonexistent/docsift.toml").unwrap_err();
        assert!(err.to_string().contains("docsift.toml"));
    }
}
