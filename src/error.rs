//! Error types for the pdf-translate library.
//!
//! Every failure is fatal for the file in flight: there is no partial result
//! to salvage from a translation job, so a single [`TranslateError`] enum
//! covers all phases. Variants are grouped by the phase that raises them so
//! callers can match on the phase without parsing messages.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf-translate library.
#[derive(Debug, Error)]
pub enum TranslateError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Service errors ────────────────────────────────────────────────────
    /// The extraction service could not be reached at all.
    #[error("Extraction service unreachable during {operation}: {reason}\nIs the server running at the configured --server URL?")]
    ServiceUnavailable { operation: String, reason: String },

    /// The extraction service answered with a non-success status.
    #[error("Extraction service rejected {operation} (HTTP {status}): {body}")]
    ServiceError {
        operation: String,
        status: u16,
        body: String,
    },

    /// A graph with this name is already registered; the server keeps its
    /// definition, so the local one would be ignored.
    #[error("Extraction graph '{name}' already exists in namespace '{namespace}'\nUse a different graph name, pass --reuse-graph to keep the server's definition, or --skip-graph-create.")]
    GraphExists { name: String, namespace: String },

    /// The extraction service answered with a body we could not interpret.
    #[error("Unexpected response from extraction service during {operation}: {detail}")]
    InvalidResponse { operation: String, detail: String },

    // ── Polling errors ────────────────────────────────────────────────────
    /// The service reported that extraction of this content failed.
    #[error("Extraction failed for content '{content_id}': {reason}")]
    ExtractionFailed { content_id: String, reason: String },

    /// The job did not complete before the polling deadline.
    #[error("Content '{content_id}' still pending after {elapsed_secs}s ({attempts} status checks)\nIncrease --timeout or check the extractor logs.")]
    PollTimeout {
        content_id: String,
        elapsed_secs: u64,
        attempts: u32,
    },

    // ── Retrieval errors ──────────────────────────────────────────────────
    /// The step completed but produced nothing.
    #[error("Policy '{policy}' produced no artifacts for content '{content_id}'")]
    NoArtifacts { content_id: String, policy: String },

    /// The artifact bytes are not valid UTF-8.
    #[error("Artifact '{artifact_id}' is not valid UTF-8: {source}")]
    DecodeFailed {
        artifact_id: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write a file.
    #[error("Failed to write file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The pipeline definition could not be parsed or serialised.
    #[error("Invalid extraction graph: {0}")]
    InvalidGraph(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_timeout_display() {
        let e = TranslateError::PollTimeout {
            content_id: "abc123".into(),
            elapsed_secs: 30,
            attempts: 7,
        };
        let msg = e.to_string();
        assert!(msg.contains("abc123"), "got: {msg}");
        assert!(msg.contains("30s"), "got: {msg}");
        assert!(msg.contains("7 status checks"), "got: {msg}");
    }

    #[test]
    fn service_error_display() {
        let e = TranslateError::ServiceError {
            operation: "upload".into(),
            status: 404,
            body: "graph not found".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("HTTP 404"));
        assert!(msg.contains("graph not found"));
    }

    #[test]
    fn decode_failed_keeps_source() {
        let source = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let e = TranslateError::DecodeFailed {
            artifact_id: "child-1".into(),
            source,
        };
        assert!(e.to_string().contains("child-1"));
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn graph_exists_display_names_the_way_out() {
        let e = TranslateError::GraphExists {
            name: "pdf_translator".into(),
            namespace: "default".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("'pdf_translator'"), "got: {msg}");
        assert!(msg.contains("--reuse-graph"), "got: {msg}");
    }

    #[test]
    fn extraction_failed_display() {
        let e = TranslateError::ExtractionFailed {
            content_id: "c1".into(),
            reason: "task t9 failed".into(),
        };
        assert!(e.to_string().contains("task t9 failed"));
    }
}
