//! Mock fetchers, strategies and observers for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::errors::{ExtractionError, FetchError};
use crate::extract::ExtractionStrategy;
use crate::fetch::{FetchResult, Fetcher};
use crate::models::{DocumentRef, SearchReport};
use crate::pipeline::{DocumentStatus, SearchObserver};

#[derive(Debug, Clone)]
enum MockResponse {
    Ok(FetchResult),
    Err(FetchError),
    Hang,
}

/// A fetcher that serves canned responses by URL.
///
/// Unknown URLs fail with a 404 result.
#[derive(Debug, Default)]
pub struct MockFetcher {
    config: FetchConfig,
    responses: Mutex<HashMap<String, MockResponse>>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    /// Creates an empty mock fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(self, url: &str, response: MockResponse) -> Self {
        self.responses.lock().insert(url.to_string(), response);
        self
    }

    /// Serves `body` with status 200 and the given content type.
    #[must_use]
    pub fn with_body(self, url: &str, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        let result = FetchResult {
            status_code: 200,
            body: body.into(),
            final_url: url.to_string(),
            content_type: Some(content_type.to_string()),
            duration_ms: 1.0,
        };
        self.insert(url, MockResponse::Ok(result))
    }

    /// Serves an HTML page.
    #[must_use]
    pub fn with_html(self, url: &str, html: &str) -> Self {
        self.with_body(url, "text/html; charset=utf-8", html.as_bytes().to_vec())
    }

    /// Serves a PDF body.
    #[must_use]
    pub fn with_pdf(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.with_body(url, "application/pdf", body)
    }

    /// Serves an empty body with the given status.
    #[must_use]
    pub fn with_status(self, url: &str, status_code: u16) -> Self {
        let result = FetchResult {
            status_code,
            final_url: url.to_string(),
            ..FetchResult::default()
        };
        self.insert(url, MockResponse::Ok(result))
    }

    /// Fails requests to `url` with `error`.
    #[must_use]
    pub fn with_error(self, url: &str, error: FetchError) -> Self {
        self.insert(url, MockResponse::Err(error))
    }

    /// Never answers requests to `url`.
    #[must_use]
    pub fn with_hang(self, url: &str) -> Self {
        self.insert(url, MockResponse::Hang)
    }

    /// URLs requested so far, in request order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        self.requests.lock().push(url.to_string());
        let response = self.responses.lock().get(url).cloned();
        match response {
            Some(MockResponse::Ok(result)) => Ok(result),
            Some(MockResponse::Err(error)) => Err(error),
            Some(MockResponse::Hang) => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
            None => Ok(FetchResult {
                status_code: 404,
                final_url: url.to_string(),
                ..FetchResult::default()
            }),
        }
    }

    fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[derive(Debug, Clone)]
enum Script {
    Pages(Vec<String>),
    ByDocument(HashMap<Vec<u8>, Vec<String>>),
    Fail(String),
}

/// An extraction strategy with a scripted result.
#[derive(Debug)]
pub struct MockStrategy {
    name: String,
    script: Script,
    calls: AtomicUsize,
}

impl MockStrategy {
    fn new(name: &str, script: Script) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            script,
            calls: AtomicUsize::new(0),
        })
    }

    /// Always returns the given pages.
    #[must_use]
    pub fn pages(name: &str, pages: &[&str]) -> Arc<Self> {
        Self::new(name, Script::Pages(pages.iter().map(|p| (*p).to_string()).collect()))
    }

    /// Always completes without text.
    #[must_use]
    pub fn empty(name: &str) -> Arc<Self> {
        Self::new(name, Script::Pages(Vec::new()))
    }

    /// Always fails with a parse error.
    #[must_use]
    pub fn failing(name: &str, message: &str) -> Arc<Self> {
        Self::new(name, Script::Fail(message.to_string()))
    }

    /// Returns text keyed by the exact document bytes; unknown bytes yield no text.
    #[must_use]
    pub fn by_document(name: &str, documents: &[(&[u8], &str)]) -> Arc<Self> {
        let map = documents
            .iter()
            .map(|(bytes, text)| (bytes.to_vec(), vec![(*text).to_string()]))
            .collect();
        Self::new(name, Script::ByDocument(map))
    }

    /// Number of times the strategy ran.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionStrategy for MockStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract_pages(&self, pdf: Arc<[u8]>) -> Result<Vec<String>, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Pages(pages) => Ok(pages.clone()),
            Script::ByDocument(map) => Ok(map.get(&pdf[..]).cloned().unwrap_or_default()),
            Script::Fail(message) => Err(ExtractionError::Parse {
                strategy: self.name.clone(),
                message: message.clone(),
            }),
        }
    }
}

/// An observer that records every callback.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, in callback order.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl SearchObserver for RecordingObserver {
    fn on_discovery_complete(&self, documents: &[DocumentRef]) {
        self.events.lock().push(format!("discovered:{}", documents.len()));
    }

    fn on_document_start(&self, _index: usize, _total: usize, document: &DocumentRef) {
        self.events.lock().push(format!("start:{}", document.title));
    }

    fn on_document_complete(
        &self,
        _index: usize,
        _total: usize,
        document: &DocumentRef,
        status: &DocumentStatus,
    ) {
        self.events
            .lock()
            .push(format!("complete:{}:{}", document.title, status.label()));
    }

    fn on_search_complete(&self, report: &SearchReport) {
        self.events.lock().push(format!("finished:{}", report.results.len()));
    }
}
