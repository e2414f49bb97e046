//! Result retrieval and UTF-8 decoding.

use crate::error::TranslateError;
use crate::service::{Artifact, ContentId, ExtractionService};
use tracing::{debug, info};

/// Decode the first artifact's content as UTF-8.
///
/// Invalid UTF-8 is an error, never replaced with U+FFFD: a translation
/// with silently mangled characters is worse than none.
pub fn decode_first_artifact(
    artifacts: Vec<Artifact>,
    content_id: &ContentId,
    policy_name: &str,
) -> Result<String, TranslateError> {
    let first = artifacts
        .into_iter()
        .next()
        .ok_or_else(|| TranslateError::NoArtifacts {
            content_id: content_id.to_string(),
            policy: policy_name.to_string(),
        })?;

    debug!(
        "Decoding artifact {} ({}, {} bytes)",
        first.id,
        first.mime_type,
        first.content.len()
    );

    String::from_utf8(first.content).map_err(|source| TranslateError::DecodeFailed {
        artifact_id: first.id,
        source,
    })
}

/// Fetch the artifacts `policy_name` produced and decode the first one.
pub async fn fetch_text(
    service: &dyn ExtractionService,
    content_id: &ContentId,
    graph_name: &str,
    policy_name: &str,
) -> Result<String, TranslateError> {
    let artifacts = service
        .extracted_content(content_id, graph_name, policy_name)
        .await?;
    info!(
        "Policy '{}' produced {} artifact(s) for {}",
        policy_name,
        artifacts.len(),
        content_id
    );
    decode_first_artifact(artifacts, content_id, policy_name)
}

/// At most `max_chars` characters of `text`, cut on a char boundary.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
