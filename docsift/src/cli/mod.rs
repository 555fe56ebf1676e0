//! Command-line interface.

pub mod display;
pub mod progress;

use clap::Parser;
use std::path::PathBuf;

use docsift::config::DocsiftConfig;
use docsift::errors::Result;

#[derive(Parser, Debug)]
#[command(version, about = "Search the PDF documents linked from a listing page for a keyword")]
pub struct Args {
    /// Word or phrase to search for (case-insensitive)
    pub keyword: String,

    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Listing page to scan for document links
    #[arg(long, value_name = "URL")]
    pub listing_url: Option<String>,

    /// Maximum number of documents to search
    #[arg(short = 'n', long, value_name = "N")]
    pub max_documents: Option<usize>,

    /// Documents processed concurrently (1-4)
    #[arg(short = 'j', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// HTTP request timeout
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Skip the OCR fallback for scanned documents
    #[arg(long)]
    pub no_ocr: bool,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Write log events to stderr as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Args {
    /// Loads the configuration file (or defaults) and applies flag overrides.
    pub fn load_config(&self) -> Result<DocsiftConfig> {
        let mut config = match &self.config {
            Some(path) => DocsiftConfig::from_file(path)?,
            None => DocsiftConfig::default(),
        };

        if let Some(url) = &self.listing_url {
            config.discovery.listing_url.clone_from(url);
        }
        if let Some(max) = self.max_documents {
            config.discovery.max_documents = max;
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrent = concurrency;
        }
        if let Some(timeout) = self.timeout {
            config.fetch.timeout_seconds = timeout;
        }
        if self.no_ocr {
            config.extraction.enable_ocr = false;
        }
        config.verbose |= self.verbose;

        config.validate()?;
        Ok(config)
    }
}
