//! OCR fallback for scanned PDFs.
//!
//! Pages are rasterized with `pdftoppm` and recognized one by one with
//! `tesseract`. All intermediate files live in a scratch directory that is
//! removed when the strategy returns, fails, times out or is dropped; child
//! processes are killed when their future is dropped.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

use super::ExtractionStrategy;
use crate::config::OcrConfig;
use crate::errors::ExtractionError;

const NAME: &str = "ocr";

/// Strategy C: rasterize and recognize.
#[derive(Debug, Clone)]
pub struct OcrStrategy {
    config: OcrConfig,
}

impl OcrStrategy {
    /// Creates the strategy.
    #[must_use]
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    fn io_error(e: &io::Error) -> ExtractionError {
        ExtractionError::Io {
            strategy: NAME.to_string(),
            message: e.to_string(),
        }
    }

    fn spawn_error(tool: &str, e: &io::Error) -> ExtractionError {
        if e.kind() == io::ErrorKind::NotFound {
            ExtractionError::ToolUnavailable {
                strategy: NAME.to_string(),
                tool: tool.to_string(),
            }
        } else {
            ExtractionError::Tool {
                strategy: NAME.to_string(),
                tool: tool.to_string(),
                message: e.to_string(),
            }
        }
    }

    fn scratch_dir(&self) -> Result<TempDir, ExtractionError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("docsift-ocr-");
        let dir = match &self.config.scratch_dir {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        };
        dir.map_err(|e| Self::io_error(&e))
    }

    async fn rasterize(&self, pdf_path: &Path, prefix: &Path) -> Result<(), ExtractionError> {
        let tool = &self.config.pdftoppm_path;
        let output = Command::new(tool)
            .arg("-png")
            .arg("-r")
            .arg(self.config.dpi.to_string())
            .arg("-f")
            .arg("1")
            .arg("-l")
            .arg(self.config.max_pages.to_string())
            .arg(pdf_path)
            .arg(prefix)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Self::spawn_error(tool, &e))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ExtractionError::Tool {
                strategy: NAME.to_string(),
                tool: tool.clone(),
                message: failure_message(&output),
            })
        }
    }

    async fn page_images(dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| Self::io_error(&e))?;
        let mut images = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| Self::io_error(&e))? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "png") {
                images.push(path);
            }
        }
        // pdftoppm zero-pads page numbers, so name order is page order.
        images.sort();
        Ok(images)
    }

    async fn recognize(&self, image: &Path) -> Result<String, ExtractionError> {
        let tool = &self.config.tesseract_path;
        let output = Command::new(tool)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .arg("--psm")
            .arg("1")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Self::spawn_error(tool, &e))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(ExtractionError::Tool {
                strategy: NAME.to_string(),
                tool: tool.clone(),
                message: failure_message(&output),
            })
        }
    }

    async fn run(&self, pdf: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let scratch = self.scratch_dir()?;
        let pdf_path = scratch.path().join("document.pdf");
        tokio::fs::write(&pdf_path, pdf).await.map_err(|e| Self::io_error(&e))?;

        self.rasterize(&pdf_path, &scratch.path().join("page")).await?;

        let images = Self::page_images(scratch.path()).await?;
        if images.is_empty() {
            return Err(ExtractionError::Tool {
                strategy: NAME.to_string(),
                tool: self.config.pdftoppm_path.clone(),
                message: "no page images produced".to_string(),
            });
        }
        debug!(pages = images.len(), "rasterized document");

        let mut pages = Vec::with_capacity(images.len());
        for (index, image) in images.iter().enumerate() {
            match self.recognize(image).await {
                Ok(text) => pages.push(text),
                // A missing binary fails every page the same way.
                Err(e @ ExtractionError::ToolUnavailable { .. }) => return Err(e),
                Err(e) => warn!(page = index + 1, error = %e, "OCR failed for page"),
            }
        }
        Ok(pages)
    }
}

fn failure_message(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        output.status.to_string()
    } else {
        stderr.to_string()
    }
}

#[async_trait]
impl ExtractionStrategy for OcrStrategy {
    fn name(&self) -> &str {
        NAME
    }

    async fn extract_pages(&self, pdf: Arc<[u8]>) -> Result<Vec<String>, ExtractionError> {
        let timeout = self.config.timeout();
        tokio::time::timeout(timeout, self.run(&pdf))
            .await
            .unwrap_or_else(|_| {
                Err(ExtractionError::Timeout {
                    strategy: NAME.to_string(),
                    seconds: timeout.as_secs_f64(),
                })
            })
    }
}
