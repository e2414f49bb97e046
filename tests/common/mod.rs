//! Shared test doubles: an in-memory extraction service and a one-route
//! HTTP server for download tests.

#![allow(dead_code)]

use async_trait::async_trait;
use pdf_translate::{Artifact, ContentId, ContentStatus, ExtractionGraph, ExtractionService, TranslateError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Route library logs to the test harness. `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fake service that replays a scripted sequence of statuses.
///
/// Once the script runs out the last status repeats forever, so a script of
/// `[Pending]` models a job that never completes.
pub struct FakeService {
    statuses: Vec<ContentStatus>,
    artifacts: Vec<Artifact>,
    status_calls: AtomicU32,
    pub graphs: Mutex<Vec<ExtractionGraph>>,
    pub uploads: Mutex<Vec<(String, PathBuf, Vec<u8>)>>,
    pub fetches: Mutex<Vec<(ContentId, String, String)>>,
}

impl FakeService {
    pub fn new(statuses: Vec<ContentStatus>, artifacts: Vec<Artifact>) -> Self {
        assert!(!statuses.is_empty(), "script needs at least one status");
        Self {
            statuses,
            artifacts,
            status_calls: AtomicU32::new(0),
            graphs: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            fetches: Mutex::new(Vec::new()),
        }
    }

    /// Pending `pending` times, then completed with one text artifact.
    pub fn completing_after(pending: usize, text: &str) -> Self {
        let mut statuses = vec![ContentStatus::Pending; pending];
        statuses.push(ContentStatus::Completed);
        Self::new(statuses, vec![text_artifact("child-1", text.as_bytes())])
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }
}

pub fn text_artifact(id: &str, content: &[u8]) -> Artifact {
    Artifact {
        id: id.to_string(),
        mime_type: "text/plain".to_string(),
        content: content.to_vec(),
    }
}

#[async_trait]
impl ExtractionService for FakeService {
    async fn create_extraction_graph(&self, graph: &ExtractionGraph) -> Result<(), TranslateError> {
        self.graphs.lock().unwrap().push(graph.clone());
        Ok(())
    }

    async fn upload_file(&self, graph_name: &str, path: &Path) -> Result<ContentId, TranslateError> {
        let bytes = tokio::fs::read(path).await.map_err(|_| TranslateError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        self.uploads
            .lock()
            .unwrap()
            .push((graph_name.to_string(), path.to_path_buf(), bytes));
        Ok(ContentId::from("content-42"))
    }

    async fn content_status(&self, _content_id: &ContentId) -> Result<ContentStatus, TranslateError> {
        let n = self.status_calls.fetch_add(1, Ordering::SeqCst) as usize;
        let idx = n.min(self.statuses.len() - 1);
        Ok(self.statuses[idx].clone())
    }

    async fn extracted_content(
        &self,
        content_id: &ContentId,
        graph_name: &str,
        policy_name: &str,
    ) -> Result<Vec<Artifact>, TranslateError> {
        self.fetches.lock().unwrap().push((
            content_id.clone(),
            graph_name.to_string(),
            policy_name.to_string(),
        ));
        Ok(self.artifacts.clone())
    }
}

/// Serve `body` with the given status line to every connection until the
/// test ends. Returns the base URL (`http://127.0.0.1:<port>`).
pub async fn serve_bytes(status: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let body = body.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/pdf\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}
