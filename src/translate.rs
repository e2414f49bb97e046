//! Translation entry points.
//!
//! A run is strictly sequential: resolve input → register graph → upload →
//! wait → fetch and decode. Nothing runs concurrently and exactly one file is
//! in flight, so no state is shared between phases beyond the content id.

use crate::config::TranslationConfig;
use crate::error::TranslateError;
use crate::graph::ExtractionGraph;
use crate::output::{TranslationOutput, TranslationStats};
use crate::pipeline::{decode, input, poll};
use crate::service::{ExtractionService, HttpExtractionService};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Translate a PDF file or URL through `service`.
///
/// # Arguments
/// * `input_str` — local file path or HTTP/HTTPS URL
/// * `graph`     — pipeline definition; its last policy is the one read back
/// * `service`   — the extraction service to submit to
/// * `config`    — client-side configuration
///
/// # Errors
/// Every phase failure is returned as-is; nothing is retried.
pub async fn translate(
    input_str: impl AsRef<str>,
    graph: &ExtractionGraph,
    service: &dyn ExtractionService,
    config: &TranslationConfig,
) -> Result<TranslationOutput, TranslateError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    graph.validate()?;
    let policy = graph
        .output_policy()
        .ok_or_else(|| TranslateError::InvalidGraph(format!("graph '{}' has no policies", graph.name)))?;
    info!("Starting translation of {} with graph '{}'", input_str, graph.name);

    let mut stats = TranslationStats::default();
    let progress = config.progress_callback.as_ref();

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let download_start = Instant::now();
    let resolved = input::resolve_input(
        input_str,
        config.work_dir.as_deref(),
        config.download_timeout_secs,
    )
    .await?;
    stats.download_duration_ms = download_start.elapsed().as_millis() as u64;
    stats.downloaded_bytes = resolved.downloaded_bytes();
    stats.uploaded_bytes = tokio::fs::metadata(resolved.path())
        .await
        .map(|m| m.len())
        .map_err(|_| TranslateError::FileNotFound {
            path: resolved.path().to_path_buf(),
        })?;
    if let Some(cb) = progress {
        cb.on_input_ready(stats.uploaded_bytes);
    }

    // ── Step 2: Register graph ───────────────────────────────────────────
    if config.create_graph {
        service.create_extraction_graph(graph).await?;
    }

    // ── Step 3: Upload ───────────────────────────────────────────────────
    let upload_start = Instant::now();
    let content_id = service.upload_file(&graph.name, resolved.path()).await?;
    stats.upload_duration_ms = upload_start.elapsed().as_millis() as u64;
    info!("Uploaded {} as content {}", resolved.path().display(), content_id);
    if let Some(cb) = progress {
        cb.on_submitted(&content_id);
    }

    // ── Step 4: Wait for extraction ──────────────────────────────────────
    let wait_start = Instant::now();
    stats.poll_attempts =
        poll::wait_for_completion(service, &content_id, &config.poll, progress).await?;
    stats.wait_duration_ms = wait_start.elapsed().as_millis() as u64;

    // ── Step 5: Fetch and decode ─────────────────────────────────────────
    let fetch_start = Instant::now();
    let text = decode::fetch_text(service, &content_id, &graph.name, &policy.name).await?;
    stats.fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;
    stats.output_chars = text.chars().count();
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    if let Some(cb) = progress {
        cb.on_complete(stats.output_chars);
    }
    info!(
        "Translation complete: {} chars in {}ms",
        stats.output_chars, stats.total_duration_ms
    );

    Ok(TranslationOutput {
        text,
        content_id,
        graph_name: graph.name.clone(),
        policy_name: policy.name.clone(),
        stats,
    })
}

/// Translate against the HTTP service named in `config`.
pub async fn translate_remote(
    input_str: impl AsRef<str>,
    graph: &ExtractionGraph,
    config: &TranslationConfig,
) -> Result<TranslationOutput, TranslateError> {
    let service = HttpExtractionService::new(config)?;
    translate(input_str, graph, &service, config).await
}

/// Translate and write the text to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn translate_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    graph: &ExtractionGraph,
    service: &dyn ExtractionService,
    config: &TranslationConfig,
) -> Result<TranslationOutput, TranslateError> {
    let output = translate(input_str, graph, service, config).await?;
    let path = output_path.as_ref();
    write_atomic(path, &output.text).await?;
    Ok(output)
}

/// Synchronous wrapper around [`translate_remote`].
///
/// Creates a temporary tokio runtime internally.
pub fn translate_sync(
    input_str: impl AsRef<str>,
    graph: &ExtractionGraph,
    config: &TranslationConfig,
) -> Result<TranslationOutput, TranslateError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| TranslateError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(translate_remote(input_str, graph, config))
}

/// Write `text` to a uniquely named sibling temp file, then rename it over
/// `path`. The temp file is removed if anything fails before the rename.
async fn write_atomic(path: &Path, text: &str) -> Result<(), TranslateError> {
    let path = path.to_path_buf();
    let text = text.to_owned();
    let target = path.clone();

    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| TranslateError::Internal(format!("output writer task failed: {e}")))?
    .map_err(|source| TranslateError::OutputWriteFailed {
        path: target,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_atomic_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.txt");

        write_atomic(&path, "premier").await.unwrap();
        write_atomic(&path, "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let names: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("out.txt")]);
    }

    #[tokio::test]
    async fn write_atomic_failure_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the final rename fail.
        let path = dir.path().join("out.txt");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        let err = write_atomic(&path, "texte").await.unwrap_err();

        assert!(matches!(err, TranslateError::OutputWriteFailed { .. }), "got {err:?}");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("out.txt")]);
    }

    #[tokio::test]
    async fn concurrent_writers_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let (a, b) = tokio::join!(write_atomic(&path, "un"), write_atomic(&path, "deux"));
        a.unwrap();
        b.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text == "un" || text == "deux", "got {text:?}");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
