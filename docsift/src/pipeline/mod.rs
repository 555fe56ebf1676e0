//! Search orchestration.
//!
//! This module provides:
//! - [`SearchPipeline`] running discovery, extraction and search for one keyword
//! - The [`SearchObserver`] protocol with no-op and logging implementations
//! - [`SearchProgress`] running totals for progress display

mod observer;
mod progress;
mod runner;

pub use observer::{DocumentStatus, LoggingSearchObserver, NoOpSearchObserver, SearchObserver};
pub use progress::SearchProgress;
pub use runner::SearchPipeline;
