//! Result types returned by a translation run.

use crate::service::ContentId;
use serde::{Deserialize, Serialize};

/// The decoded translation plus what it took to get it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationOutput {
    /// Decoded text of the first artifact.
    pub text: String,
    /// Handle the service assigned to the upload.
    pub content_id: ContentId,
    pub graph_name: String,
    pub policy_name: String,
    pub stats: TranslationStats,
}

/// Sizes and per-phase wall-clock timings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationStats {
    /// Bytes fetched over HTTP; 0 for local inputs.
    pub downloaded_bytes: u64,
    /// Size of the file that was uploaded.
    pub uploaded_bytes: u64,
    /// Number of status checks before completion.
    pub poll_attempts: u32,
    /// Length of the decoded text in characters.
    pub output_chars: usize,
    pub download_duration_ms: u64,
    pub upload_duration_ms: u64,
    pub wait_duration_ms: u64,
    pub fetch_duration_ms: u64,
    pub total_duration_ms: u64,
}
