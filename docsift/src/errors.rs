//! Error types for docsift.
//!
//! Only discovery, keyword and configuration errors ever stop a search. Fetch
//! and extraction errors are scoped to a single document and end up as
//! [`DocumentFailure`](crate::models::DocumentFailure) records in the report.

use thiserror::Error;

/// The main error type for docsift operations.
#[derive(Debug, Error)]
pub enum DocsiftError {
    /// The keyword was empty after trimming.
    #[error("Search keyword must not be blank")]
    EmptyKeyword,

    /// The keyword could not be compiled into a matcher.
    #[error("Invalid keyword: {0}")]
    InvalidKeyword(String),

    /// The listing page could not be turned into a document list.
    #[error("{0}")]
    Discovery(#[from] DiscoveryError),

    /// A document could not be fetched.
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// A document could not be turned into text.
    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    /// The configuration is invalid or unreadable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while fetching a URL.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("Request to {url} failed: {message}")]
    Request {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        message: String,
    },

    /// The request exceeded the configured timeout.
    #[error("Request to {url} timed out")]
    Timeout {
        /// Requested URL.
        url: String,
    },

    /// The server answered with a non-success status.
    #[error("Request to {url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The body exceeded the configured size limit.
    #[error("Response from {url} is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Requested URL.
        url: String,
        /// Observed size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// The body is not a PDF (usually an HTML error page).
    #[error("Response from {url} is not a PDF (content type: {content_type})")]
    NotPdf {
        /// Requested URL.
        url: String,
        /// Content type reported by the server, or "unknown".
        content_type: String,
    },
}

impl FetchError {
    /// Builds a fetch error from a reqwest error.
    #[must_use]
    pub fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Request {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Errors raised while discovering documents on the listing page.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    /// The listing page could not be fetched.
    #[error("Failed to fetch listing page: {0}")]
    Fetch(#[from] FetchError),

    /// The listing page answered with a non-success status.
    #[error("Listing page {url} returned HTTP {status}")]
    Status {
        /// Listing URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// No anchor on the listing page pointed at the download endpoint.
    #[error("No documents found on {url} (no links containing '{marker}')")]
    NoDocuments {
        /// Listing URL.
        url: String,
        /// Download endpoint marker that was searched for.
        marker: String,
    },

    /// The listing URL itself could not be parsed.
    #[error("Invalid listing URL '{url}': {message}")]
    InvalidUrl {
        /// Offending URL.
        url: String,
        /// Parser message.
        message: String,
    },
}

/// Errors raised by a single extraction strategy.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExtractionError {
    /// The PDF library rejected the document.
    #[error("{strategy}: failed to parse PDF: {message}")]
    Parse {
        /// Strategy name.
        strategy: String,
        /// Library message.
        message: String,
    },

    /// The PDF library panicked while parsing.
    #[error("{strategy}: parser panicked")]
    Panicked {
        /// Strategy name.
        strategy: String,
    },

    /// An external tool needed by the strategy is not installed.
    #[error("{strategy}: required tool '{tool}' is not available")]
    ToolUnavailable {
        /// Strategy name.
        strategy: String,
        /// Executable name or path.
        tool: String,
    },

    /// An external tool exited with an error.
    #[error("{strategy}: '{tool}' failed: {message}")]
    Tool {
        /// Strategy name.
        strategy: String,
        /// Executable name or path.
        tool: String,
        /// Captured stderr or exit description.
        message: String,
    },

    /// The strategy did not finish in time.
    #[error("{strategy}: timed out after {seconds:.1}s")]
    Timeout {
        /// Strategy name.
        strategy: String,
        /// Configured timeout.
        seconds: f64,
    },

    /// Scratch file handling failed.
    #[error("{strategy}: IO error: {message}")]
    Io {
        /// Strategy name.
        strategy: String,
        /// IO error message.
        message: String,
    },
}

impl ExtractionError {
    /// Returns the name of the strategy that raised this error.
    #[must_use]
    pub fn strategy(&self) -> &str {
        match self {
            Self::Parse { strategy, .. }
            | Self::Panicked { strategy }
            | Self::ToolUnavailable { strategy, .. }
            | Self::Tool { strategy, .. }
            | Self::Timeout { strategy, .. }
            | Self::Io { strategy, .. } => strategy,
        }
    }
}

/// Result type alias for docsift operations.
pub type Result<T> = std::result::Result<T, DocsiftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            url: "https://example.com/doc".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "Request to https://example.com/doc returned HTTP 404");
    }

    #[test]
    fn test_discovery_error_from_fetch() {
        let fetch = FetchError::Timeout {
            url: "https://example.com".to_string(),
        };
        let err: DiscoveryError = fetch.into();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_docsift_error_conversions() {
        let err: DocsiftError = DiscoveryError::NoDocuments {
            url: "https://example.com".to_string(),
            marker: "download.jsp".to_string(),
        }
        .into();
        assert!(matches!(err, DocsiftError::Discovery(_)));
        assert!(err.to_string().contains("download.jsp"));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DocsiftError = io.into();
        assert!(matches!(err, DocsiftError::Io(_)));
    }

    #[test]
    fn test_extraction_error_strategy() {
        let err = ExtractionError::ToolUnavailable {
            strategy: "ocr".to_string(),
            tool: "tesseract".to_string(),
        };
        assert_eq!(err.strategy(), "ocr");
        assert!(err.to_string().contains("tesseract"));
    }
}
