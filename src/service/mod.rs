//! The extraction service seam.
//!
//! The extraction service is an external collaborator: it stores uploaded
//! files, runs the graph's policies against them and keeps the produced
//! artifacts. This crate only consumes it through [`ExtractionService`], so
//! the orchestration in [`crate::translate`] runs equally well against the
//! REST client in [`http`] or an in-memory fake in tests.

pub mod http;

use crate::error::TranslateError;
use crate::graph::ExtractionGraph;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub use http::HttpExtractionService;

/// Opaque handle the service returns for an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ContentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extraction progress of one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContentStatus {
    /// Submitted; at least one policy has not finished.
    Pending,
    /// Every policy finished successfully; artifacts are retrievable.
    Completed,
    /// At least one policy failed. Terminal.
    Failed { reason: String },
}

impl ContentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ContentStatus::Pending)
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentStatus::Pending => f.write_str("pending"),
            ContentStatus::Completed => f.write_str("completed"),
            ContentStatus::Failed { reason } => write!(f, "failed ({reason})"),
        }
    }
}

/// An output object produced by a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub id: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

/// The operations this crate consumes from an extraction service.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// Register a graph under its name.
    async fn create_extraction_graph(&self, graph: &ExtractionGraph) -> Result<(), TranslateError>;

    /// Upload a local file and run `graph_name` against it.
    async fn upload_file(&self, graph_name: &str, path: &Path) -> Result<ContentId, TranslateError>;

    /// Report how far extraction of `content_id` has progressed.
    async fn content_status(&self, content_id: &ContentId) -> Result<ContentStatus, TranslateError>;

    /// Artifacts produced by `policy_name` of `graph_name` for `content_id`,
    /// in the order the service lists them.
    async fn extracted_content(
        &self,
        content_id: &ContentId,
        graph_name: &str,
        policy_name: &str,
    ) -> Result<Vec<Artifact>, TranslateError>;
}
