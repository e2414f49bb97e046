//! Waiting for an extraction job to finish.
//!
//! The wait is a plain async loop: check the status, sleep, check again.
//! It never returns `Ok` before the service reports [`ContentStatus::Completed`].
//!
//! ## Backoff
//!
//! The sleep starts at `PollPolicy::initial_interval` and doubles after each
//! pending answer, capped at `max_interval`: with the defaults the sequence is
//! 500 ms → 1 s → 2 s → 4 s → 8 s → 10 s → 10 s …
//!
//! ## Termination
//!
//! * completed → `Ok(attempts)`
//! * failed → [`TranslateError::ExtractionFailed`]
//! * deadline passed → [`TranslateError::PollTimeout`]
//! * caller drops the future → the loop stops at its next await point
//!
//! Transport errors from the status call propagate immediately.

use crate::config::PollPolicy;
use crate::error::TranslateError;
use crate::progress::ProgressCallback;
use crate::service::{ContentId, ContentStatus, ExtractionService};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Block until `content_id` completes, fails, or the deadline passes.
///
/// Returns the number of status checks made.
pub async fn wait_for_completion(
    service: &dyn ExtractionService,
    content_id: &ContentId,
    policy: &PollPolicy,
    progress: Option<&ProgressCallback>,
) -> Result<u32, TranslateError> {
    let start = Instant::now();
    let deadline = policy.timeout.map(|t| start + t);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let status = service.content_status(content_id).await?;
        debug!("Content {}: check {} -> {}", content_id, attempt, status);

        if let Some(cb) = progress {
            cb.on_poll(attempt, &status);
        }

        match status {
            ContentStatus::Completed => {
                info!(
                    "Content {} completed after {} checks ({:?})",
                    content_id,
                    attempt,
                    start.elapsed()
                );
                return Ok(attempt);
            }
            ContentStatus::Failed { reason } => {
                warn!("Content {} failed: {}", content_id, reason);
                return Err(TranslateError::ExtractionFailed {
                    content_id: content_id.to_string(),
                    reason,
                });
            }
            ContentStatus::Pending => {}
        }

        let mut delay = policy.interval_after(attempt);
        if let Some(deadline) = deadline {
            let now = Instant::now();
            if now >= deadline {
                return Err(TranslateError::PollTimeout {
                    content_id: content_id.to_string(),
                    elapsed_secs: start.elapsed().as_secs(),
                    attempts: attempt,
                });
            }
            // One last check right at the deadline rather than sleeping past it.
            delay = delay.min(deadline - now);
        }
        sleep(delay).await;
    }
}
