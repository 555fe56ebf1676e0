//! Orchestration of discovery, extraction and search.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{DocumentStatus, NoOpSearchObserver, SearchObserver};
use crate::cancellation::CancellationToken;
use crate::config::DocsiftConfig;
use crate::discovery::LinkDiscoverer;
use crate::errors::{FetchError, Result};
use crate::extract::TextExtractor;
use crate::fetch::{Fetcher, HttpFetcher, RateLimiter};
use crate::models::{
    DocumentFailure, DocumentRef, ExtractedText, FailureStage, ResultSet, SearchMatch,
    SearchReport,
};
use crate::search::KeywordMatcher;

enum Outcome {
    Matched(SearchMatch),
    NoMatch,
    NoText,
    Failed(DocumentFailure),
}

impl Outcome {
    fn failed(document: &DocumentRef, stage: FailureStage, message: impl Into<String>) -> Self {
        Self::Failed(DocumentFailure::new(document.clone(), stage, message))
    }
}

/// Runs one keyword search over the documents of a listing page.
///
/// Every outbound request goes through a shared [`RateLimiter`]. Documents
/// are processed with bounded concurrency and collected in discovery order;
/// per-document failures are recorded in the report and never abort the run.
pub struct SearchPipeline {
    config: DocsiftConfig,
    fetcher: Arc<dyn Fetcher>,
    discoverer: LinkDiscoverer,
    extractor: TextExtractor,
    limiter: Arc<RateLimiter>,
    observer: Arc<dyn SearchObserver>,
    cancellation: Arc<CancellationToken>,
}

impl std::fmt::Debug for SearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPipeline")
            .field("config", &self.config)
            .field("extractor", &self.extractor)
            .field("cancellation", &self.cancellation)
            .finish_non_exhaustive()
    }
}

impl SearchPipeline {
    /// Validates `config` and builds the default HTTP-backed pipeline.
    pub fn new(config: DocsiftConfig) -> Result<Self> {
        config.validate()?;

        let fetcher = Arc::new(HttpFetcher::new(config.fetch.clone())?);
        let discoverer = LinkDiscoverer::new(config.discovery.clone())?;
        let extractor = TextExtractor::from_config(&config.extraction);
        let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));

        Ok(Self {
            config,
            fetcher,
            discoverer,
            extractor,
            limiter,
            observer: Arc::new(NoOpSearchObserver),
            cancellation: Arc::new(CancellationToken::new()),
        })
    }

    /// Replaces the fetcher.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replaces the extraction strategies.
    #[must_use]
    pub fn with_extractor(mut self, extractor: TextExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Sets the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SearchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Shares a cancellation token with the caller.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: Arc<CancellationToken>) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// The run configuration.
    #[must_use]
    pub fn config(&self) -> &DocsiftConfig {
        &self.config
    }

    /// The token that cancels this pipeline's runs.
    #[must_use]
    pub fn cancellation(&self) -> Arc<CancellationToken> {
        Arc::clone(&self.cancellation)
    }

    /// Fetches the listing page and returns the documents to search.
    pub async fn discover(&self) -> Result<Vec<DocumentRef>> {
        self.limiter.acquire().await;
        let documents = self.discoverer.discover(self.fetcher.as_ref()).await?;
        self.observer.on_discovery_complete(&documents);
        Ok(documents)
    }

    /// Searches every discovered document for `keyword`.
    ///
    /// The keyword is validated before any request is made. Only a blank
    /// keyword and discovery failures are errors; everything that goes wrong
    /// with individual documents ends up in the report.
    pub async fn search(&self, keyword: &str) -> Result<SearchReport> {
        let matcher = KeywordMatcher::new(keyword, &self.config.search)?;

        let documents = tokio::select! {
            biased;
            () = self.cancellation.cancelled() => {
                info!("Search cancelled during discovery");
                let mut report = SearchReport::new(matcher.keyword(), 0);
                report.cancelled = true;
                self.observer.on_search_complete(&report);
                return Ok(report);
            }
            documents = self.discover() => documents?,
        };

        Ok(self.search_documents(&documents, &matcher).await)
    }

    /// Extracts and searches `documents`, returning matches best first.
    pub async fn search_documents(
        &self,
        documents: &[DocumentRef],
        matcher: &KeywordMatcher,
    ) -> SearchReport {
        let started = Instant::now();
        let total = documents.len();
        let mut report = SearchReport::new(matcher.keyword(), total);
        info!(
            run_id = %report.run_id,
            keyword = matcher.keyword(),
            documents = total,
            concurrency = self.config.max_concurrent,
            "Starting search"
        );

        let mut matches = Vec::new();
        let mut outcomes = stream::iter(documents.iter().enumerate())
            .map(|(index, document)| async move {
                self.observer.on_document_start(index, total, document);
                (index, self.process_document(document, matcher).await)
            })
            .buffered(self.config.max_concurrent);

        loop {
            let next = tokio::select! {
                biased;
                () = self.cancellation.cancelled() => {
                    let reason = self.cancellation.reason().unwrap_or_default();
                    info!(
                        reason = %reason,
                        processed = report.documents_processed,
                        "Search cancelled"
                    );
                    report.cancelled = true;
                    break;
                }
                next = outcomes.next() => next,
            };
            let Some((index, outcome)) = next else {
                break;
            };

            let document = &documents[index];
            report.documents_processed += 1;
            let status = match outcome {
                Outcome::Matched(found) => {
                    let status = DocumentStatus::Matched {
                        count: found.occurrence_count,
                    };
                    matches.push(found);
                    status
                }
                Outcome::NoMatch => DocumentStatus::NoMatch,
                Outcome::NoText => {
                    report.empty_documents.push(document.clone());
                    DocumentStatus::NoText
                }
                Outcome::Failed(failure) => {
                    warn!(
                        title = %document.title,
                        url = %document.url,
                        stage = %failure.stage,
                        error = %failure.message,
                        "Document skipped"
                    );
                    let status = DocumentStatus::Failed(failure.stage);
                    report.failures.push(failure);
                    status
                }
            };
            self.observer.on_document_complete(index, total, document, &status);
        }
        // Dropping the stream abandons in-flight documents.
        drop(outcomes);

        report.results = ResultSet::from_matches(matches);
        report.duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        info!(
            run_id = %report.run_id,
            matches = report.results.len(),
            failures = report.failures.len(),
            duration_ms = report.duration_ms,
            "Search finished"
        );
        self.observer.on_search_complete(&report);
        report
    }

    async fn process_document(&self, document: &DocumentRef, matcher: &KeywordMatcher) -> Outcome {
        let timeout = self.config.document_timeout();
        match tokio::time::timeout(timeout, self.examine(document, matcher)).await {
            Ok(outcome) => outcome,
            Err(_) => Outcome::failed(
                document,
                FailureStage::Timeout,
                format!("document not processed within {:.0}s", timeout.as_secs_f64()),
            ),
        }
    }

    async fn examine(&self, document: &DocumentRef, matcher: &KeywordMatcher) -> Outcome {
        self.limiter.acquire().await;

        let response = match self.fetcher.fetch(&document.url).await {
            Ok(response) => response,
            Err(e) => return Outcome::failed(document, FailureStage::Fetch, e.to_string()),
        };
        if !response.is_success() {
            let error = FetchError::Status {
                url: document.url.clone(),
                status: response.status_code,
            };
            return Outcome::failed(document, FailureStage::Fetch, error.to_string());
        }
        if !response.is_pdf() {
            let error = FetchError::NotPdf {
                url: document.url.clone(),
                content_type: response.content_type.unwrap_or_else(|| "unknown".to_string()),
            };
            return Outcome::failed(document, FailureStage::NotPdf, error.to_string());
        }

        let pdf: Arc<[u8]> = Arc::from(response.body);
        match self.extractor.extract(pdf).await {
            ExtractedText::Text { text, strategy } => match matcher.search(&text) {
                Some(hits) => Outcome::Matched(SearchMatch {
                    document: document.clone(),
                    occurrence_count: hits.count,
                    snippets: hits.snippets,
                    strategy,
                }),
                None => {
                    debug!(title = %document.title, strategy = %strategy, "no match");
                    Outcome::NoMatch
                }
            },
            ExtractedText::EmptyDocument => Outcome::NoText,
            ExtractedText::Failed { reasons } => {
                Outcome::failed(document, FailureStage::Extraction, reasons.join("; "))
            }
        }
    }
}
