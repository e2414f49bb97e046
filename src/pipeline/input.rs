//! Input resolution: get the document onto the local filesystem.
//!
//! The extraction service receives a multipart upload, so every input must
//! end up as a local file. URLs are downloaded either into the configured
//! work directory (the file survives the run) or into a `TempDir` that is
//! removed when [`ResolvedInput`] is dropped.

use crate::error::TranslateError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info};

/// The resolved input — a local path, or a downloaded file.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL downloaded into a caller-owned directory.
    Downloaded { path: PathBuf, bytes: u64 },
    /// Input was a URL downloaded into a temporary directory.
    /// The `TempDir` is kept alive until the upload is done.
    DownloadedTemp {
        path: PathBuf,
        bytes: u64,
        _temp_dir: TempDir,
    },
}

impl ResolvedInput {
    /// Get the path to the file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
            ResolvedInput::DownloadedTemp { path, .. } => path,
        }
    }

    /// Bytes fetched over the network; zero for local inputs.
    pub fn downloaded_bytes(&self) -> u64 {
        match self {
            ResolvedInput::Local(_) => 0,
            ResolvedInput::Downloaded { bytes, .. } => *bytes,
            ResolvedInput::DownloadedTemp { bytes, .. } => *bytes,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local file path.
///
/// URLs are downloaded into `work_dir` when given, otherwise into a
/// temporary directory. Local paths are validated to exist and be readable.
pub async fn resolve_input(
    input: &str,
    work_dir: Option<&Path>,
    timeout_secs: u64,
) -> Result<ResolvedInput, TranslateError> {
    if !is_url(input) {
        return resolve_local(input);
    }

    let filename = filename_from_url(input);
    match work_dir {
        Some(dir) => {
            let path = dir.join(&filename);
            let bytes = download_file(input, &path, timeout_secs).await?;
            Ok(ResolvedInput::Downloaded { path, bytes })
        }
        None => {
            let temp_dir = TempDir::new().map_err(|e| TranslateError::Internal(e.to_string()))?;
            let path = temp_dir.path().join(&filename);
            let bytes = download_file(input, &path, timeout_secs).await?;
            Ok(ResolvedInput::DownloadedTemp {
                path,
                bytes,
                _temp_dir: temp_dir,
            })
        }
    }
}

/// Resolve a local file path, validating existence and read permission.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, TranslateError> {
    let path = PathBuf::from(path_str);

    if !path.is_file() {
        return Err(TranslateError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(TranslateError::PermissionDenied { path });
        }
        Err(_) => return Err(TranslateError::FileNotFound { path }),
    }

    debug!("Resolved local input: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Download `url` and write the body verbatim to `dest`.
///
/// Parent directories are created and an existing file is overwritten.
/// Returns the number of bytes written. No retries, no resumption.
/// A `timeout_secs` of 0 waits for as long as the transfer takes.
pub async fn download_file(url: &str, dest: &Path, timeout_secs: u64) -> Result<u64, TranslateError> {
    info!("Downloading {} -> {}", url, dest.display());

    let mut builder = reqwest::Client::builder();
    if timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }
    let client = builder
        .build()
        .map_err(|e| TranslateError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_transfer = |e: reqwest::Error| {
        if e.is_timeout() {
            TranslateError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            TranslateError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(map_transfer)?;

    if !response.status().is_success() {
        return Err(TranslateError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(map_transfer)?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| TranslateError::OutputWriteFailed {
                path: dest.to_path_buf(),
                source: e,
            })?;
    }

    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| TranslateError::OutputWriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;

    info!("Downloaded {} bytes to {}", bytes.len(), dest.display());
    Ok(bytes.len() as u64)
}

/// Derive a file name from the last URL path segment.
pub fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}
