//! HTTP fetching for the listing page and documents.
//!
//! This module provides:
//! - The [`Fetcher`] protocol and its [`FetchResult`]
//! - A reqwest-backed [`HttpFetcher`]
//! - A governor-backed [`RateLimiter`] shared by all requests of a run

mod http;
mod rate_limit;

pub use http::HttpFetcher;
pub use rate_limit::{RateLimiter, MAX_INTERVAL};

use async_trait::async_trait;

use crate::config::FetchConfig;
use crate::errors::FetchError;
use crate::extract::looks_like_pdf;

/// Result of a fetch operation.
#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    /// HTTP status code.
    pub status_code: u16,
    /// Response body.
    pub body: Vec<u8>,
    /// Final URL after redirects.
    pub final_url: String,
    /// Content type from headers.
    pub content_type: Option<String>,
    /// Time taken to fetch in milliseconds.
    pub duration_ms: f64,
}

impl FetchResult {
    /// Whether the fetch was successful (2xx status).
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Whether the response is HTML.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_ref()
            .is_some_and(|ct| ct.contains("text/html") || ct.contains("application/xhtml"))
    }

    /// Whether the body starts with the PDF magic header.
    ///
    /// The content type is ignored: the source site labels error pages and
    /// PDFs inconsistently.
    #[must_use]
    pub fn is_pdf(&self) -> bool {
        looks_like_pdf(&self.body)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Protocol for HTTP fetching.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a URL. Non-success statuses are returned as results, not errors.
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError>;

    /// Gets the configuration.
    fn config(&self) -> &FetchConfig;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status_code: u16, body: &[u8], content_type: Option<&str>) -> FetchResult {
        FetchResult {
            status_code,
            body: body.to_vec(),
            final_url: "https://example.com/doc".to_string(),
            content_type: content_type.map(String::from),
            duration_ms: 1.0,
        }
    }

    #[test]
    fn test_fetch_result_is_success() {
        assert!(result(200, b"", None).is_success());
        assert!(!result(404, b"", None).is_success());
        assert!(!result(301, b"", None).is_success());
    }

    #[test]
    fn test_fetch_result_is_html() {
        assert!(result(200, b"<html>", Some("text/html; charset=utf-8")).is_html());
        assert!(!result(200, b"%PDF-", Some("application/pdf")).is_html());
        assert!(!result(200, b"", None).is_html());
    }

    #[test]
    fn test_fetch_result_is_pdf_uses_magic_bytes() {
        assert!(result(200, b"%PDF-1.7\n...", Some("application/octet-stream")).is_pdf());
        assert!(!result(200, b"<!DOCTYPE html><html>", Some("application/pdf")).is_pdf());
        assert!(!result(200, b"", None).is_pdf());
    }

    #[test]
    fn test_fetch_result_text_is_lossy() {
        let r = result(200, b"caf\xc3\xa9 \xff", None);
        assert_eq!(r.text(), "café \u{fffd}");
    }
}
