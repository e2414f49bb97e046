//! Progress-callback trait for translation phase events.
//!
//! Inject an [`Arc<dyn TranslationProgressCallback>`] via
//! [`crate::config::TranslationConfigBuilder::progress_callback`] to receive
//! events as a file moves through download, upload, polling and retrieval.
//!
//! # Example
//!
//! ```rust
//! use pdf_translate::{ContentStatus, TranslationConfig, TranslationProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicU32, Ordering}};
//!
//! struct PollCounter {
//!     polls: AtomicU32,
//! }
//!
//! impl TranslationProgressCallback for PollCounter {
//!     fn on_poll(&self, attempt: u32, status: &ContentStatus) {
//!         self.polls.store(attempt, Ordering::SeqCst);
//!         eprintln!("check #{attempt}: {status}");
//!     }
//! }
//!
//! let counter = Arc::new(PollCounter { polls: AtomicU32::new(0) });
//!
//! let config = TranslationConfig::builder()
//!     .progress_callback(counter as Arc<dyn TranslationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::service::{ContentId, ContentStatus};
use std::sync::Arc;

/// Called by the translation flow as it moves between phases.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait TranslationProgressCallback: Send + Sync {
    /// Called once the input is available locally.
    ///
    /// `bytes` is the size of the local file, whether downloaded or not.
    fn on_input_ready(&self, bytes: u64) {
        let _ = bytes;
    }

    /// Called after the service accepted the upload.
    fn on_submitted(&self, content_id: &ContentId) {
        let _ = content_id;
    }

    /// Called after every status check.
    ///
    /// # Arguments
    /// * `attempt` — 1-based count of status checks so far
    /// * `status`  — what the service reported
    fn on_poll(&self, attempt: u32, status: &ContentStatus) {
        let _ = (attempt, status);
    }

    /// Called once the artifact has been decoded.
    ///
    /// `chars` is the length of the decoded text in characters.
    fn on_complete(&self, chars: usize) {
        let _ = chars;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl TranslationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::TranslationConfig`].
pub type ProgressCallback = Arc<dyn TranslationProgressCallback>;
