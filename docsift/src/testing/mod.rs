//! Test doubles and fixtures.
//!
//! Compiled for this crate's tests and behind the `testing` feature.
//!
//! This module provides:
//! - [`MockFetcher`] serving canned responses by URL
//! - [`MockStrategy`] with scripted extraction results and call counting
//! - [`pdf_with_pages`] building small text-layer PDFs in memory
//! - [`serve_once`] / [`serve_routes`] for exercising the real HTTP client

mod fixtures;
mod mocks;

pub use fixtures::{pdf_with_pages, serve_once, serve_routes};
pub use mocks::{MockFetcher, MockStrategy, RecordingObserver};
