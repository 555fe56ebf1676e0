//! reqwest-backed fetcher.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use std::time::Instant;
use tracing::debug;

use super::{FetchResult, Fetcher};
use crate::config::FetchConfig;
use crate::errors::{DocsiftError, FetchError};

/// Fetches URLs with a shared reqwest client.
///
/// The client carries the configured user agent, extra headers, timeout and
/// redirect limit. Bodies are streamed and abandoned as soon as they exceed
/// `max_response_size`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Builds a fetcher from configuration.
    pub fn new(config: FetchConfig) -> Result<Self, DocsiftError> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                DocsiftError::Config(format!("invalid header name '{key}': {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                DocsiftError::Config(format!("invalid value for header '{key}': {e}"))
            })?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| DocsiftError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn too_large(&self, url: &str, size: usize) -> FetchError {
        FetchError::TooLarge {
            url: url.to_string(),
            size,
            limit: self.config.max_response_size,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let started = Instant::now();
        debug!(url, "fetching");

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let limit = self.config.max_response_size;
        if let Some(declared) = response.content_length() {
            let declared = usize::try_from(declared).unwrap_or(usize::MAX);
            if declared > limit {
                return Err(self.too_large(url, declared));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?
        {
            if body.len() + chunk.len() > limit {
                return Err(self.too_large(url, body.len() + chunk.len()));
            }
            body.extend_from_slice(&chunk);
        }

        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(url, status_code, bytes = body.len(), duration_ms, "fetched");

        Ok(FetchResult {
            status_code,
            body,
            final_url,
            content_type,
            duration_ms,
        })
    }

    fn config(&self) -> &FetchConfig {
        &self.config
    }
}
