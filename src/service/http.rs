//! REST client for an Indexify-style extraction service.
//!
//! ## Endpoints
//!
//! ```text
//! POST /namespaces/{ns}/extraction_graphs                         create graph (JSON)
//! POST /namespaces/{ns}/extraction_graphs/{graph}/extract         upload (multipart "file")
//! GET  /namespaces/{ns}/content/{id}/tasks                        task outcomes
//! GET  /namespaces/{ns}/extraction_graphs/{graph}/extraction_policies/{policy}/content/{id}
//!                                                                 content tree
//! GET  /namespaces/{ns}/content/{child}/download                  raw artifact bytes
//! ```
//!
//! Status is derived from task outcomes: any failed task fails the content,
//! all tasks succeeded completes it, anything else is still pending. A
//! freshly uploaded file may have no tasks yet; that counts as pending.
//!
//! Names and ids are pushed as escaped path segments, so a `/`, `?` or `#`
//! inside a graph name or content id never changes the route.
//!
//! A graph that already exists on the server (HTTP 409) is an error unless
//! reuse was requested: the server keeps the old definition, so a changed
//! model, key or policy name would otherwise be silently ignored.

use super::{Artifact, ContentId, ContentStatus, ExtractionService};
use crate::config::TranslationConfig;
use crate::error::TranslateError;
use crate::graph::ExtractionGraph;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// [`ExtractionService`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpExtractionService {
    client: Client,
    base_url: String,
    namespace: String,
    reuse_existing_graph: bool,
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct UploadResponse {
    content_id: String,
}

#[derive(Debug, Deserialize)]
struct TasksResponse {
    #[serde(default)]
    tasks: Vec<Task>,
}

/// One unit of extractor work the service scheduled for a content item.
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub extraction_policy_id: String,
    #[serde(default)]
    pub outcome: TaskOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum TaskOutcome {
    #[default]
    Unknown,
    Success,
    Failed,
}

#[derive(Debug, Deserialize)]
struct ContentTreeResponse {
    #[serde(default)]
    content_tree_metadata: Vec<ContentMetadata>,
}

#[derive(Debug, Deserialize)]
struct ContentMetadata {
    id: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    source: String,
}

/// Collapse task outcomes into a single status.
pub fn status_from_tasks(tasks: &[Task]) -> ContentStatus {
    if let Some(failed) = tasks.iter().find(|t| t.outcome == TaskOutcome::Failed) {
        return ContentStatus::Failed {
            reason: format!(
                "task '{}' of policy '{}' failed",
                failed.id, failed.extraction_policy_id
            ),
        };
    }
    if !tasks.is_empty() && tasks.iter().all(|t| t.outcome == TaskOutcome::Success) {
        ContentStatus::Completed
    } else {
        ContentStatus::Pending
    }
}

impl HttpExtractionService {
    /// Build a client for the server and namespace named in `config`.
    ///
    /// A `request_timeout_secs` of 0 leaves requests without a timeout.
    pub fn new(config: &TranslationConfig) -> Result<Self, TranslateError> {
        let mut builder = Client::builder();
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| TranslateError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, &config.server_url, &config.namespace)
            .reuse_existing_graph(config.reuse_existing_graph))
    }

    /// Use a pre-configured `reqwest::Client`.
    pub fn with_client(client: Client, base_url: &str, namespace: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            namespace: namespace.to_string(),
            reuse_existing_graph: false,
        }
    }

    /// Accept a graph that already exists on the server instead of failing.
    pub fn reuse_existing_graph(mut self, v: bool) -> Self {
        self.reuse_existing_graph = v;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `{base}/namespaces/{ns}/{segments…}`, each segment percent-escaped.
    fn url(&self, segments: &[&str]) -> Result<Url, TranslateError> {
        let invalid = |detail: String| TranslateError::InvalidConfig(format!(
            "invalid server URL '{}': {detail}",
            self.base_url
        ));
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot carry a path".into()))?
            .pop_if_empty()
            .push("namespaces")
            .push(&self.namespace)
            .extend(segments);
        Ok(url)
    }

    /// Send a request and turn transport failures and non-2xx answers into errors.
    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response, TranslateError> {
        let response = request
            .send()
            .await
            .map_err(|e| TranslateError::ServiceUnavailable {
                operation: operation.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(TranslateError::ServiceError {
            operation: operation.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn json<T: serde::de::DeserializeOwned>(
        operation: &str,
        response: Response,
    ) -> Result<T, TranslateError> {
        response
            .json::<T>()
            .await
            .map_err(|e| TranslateError::InvalidResponse {
                operation: operation.to_string(),
                detail: e.to_string(),
            })
    }

    async fn download_child(&self, child_id: &str) -> Result<Vec<u8>, TranslateError> {
        let operation = "artifact download";
        let response = self
            .send(
                operation,
                self.client.get(self.url(&["content", child_id, "download"])?),
            )
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TranslateError::InvalidResponse {
                operation: operation.to_string(),
                detail: e.to_string(),
            })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ExtractionService for HttpExtractionService {
    async fn create_extraction_graph(&self, graph: &ExtractionGraph) -> Result<(), TranslateError> {
        let operation = "graph creation";
        let request = self.client.post(self.url(&["extraction_graphs"])?).json(graph);
        match self.send(operation, request).await {
            Ok(_) => {
                info!("Created extraction graph '{}' in namespace '{}'", graph.name, self.namespace);
                Ok(())
            }
            Err(TranslateError::ServiceError { status, .. })
                if status == StatusCode::CONFLICT.as_u16() =>
            {
                if !self.reuse_existing_graph {
                    return Err(TranslateError::GraphExists {
                        name: graph.name.clone(),
                        namespace: self.namespace.clone(),
                    });
                }
                warn!(
                    "Extraction graph '{}' already exists; reusing the server's definition, local changes are ignored",
                    graph.name
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn upload_file(&self, graph_name: &str, path: &Path) -> Result<ContentId, TranslateError> {
        let operation = "upload";
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => TranslateError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => TranslateError::FileNotFound {
                path: path.to_path_buf(),
            },
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());
        let mime = mime_for(path);
        debug!("Uploading {} ({} bytes, {})", file_name, bytes.len(), mime);

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| TranslateError::Internal(format!("invalid mime type: {e}")))?;
        let form = Form::new().part("file", part);

        let request = self
            .client
            .post(self.url(&["extraction_graphs", graph_name, "extract"])?)
            .multipart(form);
        let response = self.send(operation, request).await?;
        let body: UploadResponse = Self::json(operation, response).await?;

        if body.content_id.is_empty() {
            return Err(TranslateError::InvalidResponse {
                operation: operation.to_string(),
                detail: "empty content_id".into(),
            });
        }
        Ok(ContentId::new(body.content_id))
    }

    async fn content_status(&self, content_id: &ContentId) -> Result<ContentStatus, TranslateError> {
        let operation = "status check";
        let response = self
            .send(
                operation,
                self.client.get(self.url(&["content", content_id.as_str(), "tasks"])?),
            )
            .await?;
        let body: TasksResponse = Self::json(operation, response).await?;
        Ok(status_from_tasks(&body.tasks))
    }

    async fn extracted_content(
        &self,
        content_id: &ContentId,
        graph_name: &str,
        policy_name: &str,
    ) -> Result<Vec<Artifact>, TranslateError> {
        let operation = "artifact listing";
        let url = self.url(&[
            "extraction_graphs",
            graph_name,
            "extraction_policies",
            policy_name,
            "content",
            content_id.as_str(),
        ])?;
        let response = self.send(operation, self.client.get(url)).await?;
        let tree: ContentTreeResponse = Self::json(operation, response).await?;

        let mut artifacts = Vec::new();
        for meta in tree
            .content_tree_metadata
            .into_iter()
            .filter(|m| m.source == policy_name)
        {
            let content = self.download_child(&meta.id).await?;
            debug!("Fetched artifact {} ({} bytes)", meta.id, content.len());
            artifacts.push(Artifact {
                id: meta.id,
                mime_type: meta.mime_type,
                content,
            });
        }
        Ok(artifacts)
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
