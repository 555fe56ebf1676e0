//! Link discovery on the listing page.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

use crate::config::DiscoveryConfig;
use crate::errors::{DiscoveryError, DocsiftError, Result};
use crate::fetch::Fetcher;
use crate::models::DocumentRef;

/// Finds download links on a listing page.
#[derive(Debug, Clone)]
pub struct LinkDiscoverer {
    config: DiscoveryConfig,
    anchors: Selector,
}

impl LinkDiscoverer {
    /// Creates a discoverer for `config`.
    pub fn new(config: DiscoveryConfig) -> Result<Self> {
        let anchors = Selector::parse("a[href]")
            .map_err(|e| DocsiftError::Config(format!("invalid anchor selector: {e:?}")))?;
        Ok(Self { config, anchors })
    }

    /// The discovery configuration.
    #[must_use]
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Parses the configured listing URL.
    pub fn listing_url(&self) -> std::result::Result<Url, DiscoveryError> {
        Url::parse(&self.config.listing_url).map_err(|e| DiscoveryError::InvalidUrl {
            url: self.config.listing_url.clone(),
            message: e.to_string(),
        })
    }

    /// Fetches the listing page and returns its document links.
    ///
    /// Network errors, non-success statuses and pages without a single
    /// qualifying link are all reported as [`DiscoveryError`].
    pub async fn discover(
        &self,
        fetcher: &dyn Fetcher,
    ) -> std::result::Result<Vec<DocumentRef>, DiscoveryError> {
        let listing = self.listing_url()?;
        info!(url = %listing, "fetching listing page");

        let page = fetcher.fetch(listing.as_str()).await?;
        if !page.is_success() {
            return Err(DiscoveryError::Status {
                url: listing.to_string(),
                status: page.status_code,
            });
        }

        // Relative links resolve against where the page actually came from.
        let base = Url::parse(&page.final_url).unwrap_or(listing);
        let documents = self.parse(&page.text(), &base);
        if documents.is_empty() {
            return Err(DiscoveryError::NoDocuments {
                url: base.to_string(),
                marker: self.config.link_marker.clone(),
            });
        }

        info!(count = documents.len(), "discovered documents");
        Ok(documents)
    }

    /// Extracts document links from listing HTML, in page order.
    ///
    /// An anchor qualifies when its resolved target contains the link marker.
    /// At most `max_documents` links are returned.
    #[must_use]
    pub fn parse(&self, html: &str, base: &Url) -> Vec<DocumentRef> {
        let document = Html::parse_document(html);
        let mut refs = Vec::new();

        for anchor in document.select(&self.anchors) {
            if refs.len() >= self.config.max_documents {
                break;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(target) = base.join(href.trim()) else {
                debug!(href, "skipping unresolvable link");
                continue;
            };
            if !target.as_str().contains(&self.config.link_marker) {
                continue;
            }

            let title = anchor_title(&anchor);
            let title = if title.is_empty() {
                DocumentRef::placeholder_title(refs.len() + 1)
            } else {
                title
            };

            let identifier = self.identifier(&target);
            let url = match (&identifier, &self.config.download_url_template) {
                (Some(id), Some(template)) => rebuild_url(template, id, base).unwrap_or(target),
                _ => target,
            };

            let mut doc = DocumentRef::new(title, url.to_string());
            doc.identifier = identifier;
            refs.push(doc);
        }

        refs
    }

    fn identifier(&self, target: &Url) -> Option<String> {
        let param = self.config.id_param.as_deref()?;
        target
            .query_pairs()
            .find(|(key, _)| key == param)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }
}

fn anchor_title(anchor: &ElementRef<'_>) -> String {
    anchor
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn rebuild_url(template: &str, id: &str, base: &Url) -> Option<Url> {
    let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
    base.join(&template.replace("{id}", &encoded)).ok()
}
