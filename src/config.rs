//! Configuration types for a translation run.
//!
//! All client-side behaviour is controlled through [`TranslationConfig`],
//! built via its [`TranslationConfigBuilder`]. The pipeline itself (model,
//! credential, instruction) is not configured here; it lives in the
//! [`crate::graph::ExtractionGraph`] handed to the service.

use crate::error::TranslateError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Base URL of a locally running extraction service.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8900";

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "default";

/// How [`crate::pipeline::poll::wait_for_completion`] waits for a job.
///
/// The interval starts at `initial_interval` and doubles after every
/// pending answer until it reaches `max_interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// Give up after this long. `None` waits for as long as the job runs.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(10),
            timeout: Some(Duration::from_secs(600)),
        }
    }
}

impl PollPolicy {
    /// Delay before the status check following `attempt` (1-based).
    pub fn interval_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_interval
            .saturating_mul(factor)
            .min(self.max_interval)
    }
}

/// Configuration for a PDF translation run.
///
/// # Example
/// ```rust
/// use pdf_translate::TranslationConfig;
///
/// let config = TranslationConfig::builder()
///     .server_url("http://indexify.internal:8900")
///     .namespace("translations")
///     .poll_timeout_secs(300)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct TranslationConfig {
    /// Base URL of the extraction service. Default: `http://localhost:8900`.
    pub server_url: String,

    /// Service namespace holding the graph and uploaded content. Default: `default`.
    pub namespace: String,

    /// Download timeout for URL inputs in seconds. Default: 120.
    /// `0` disables the timeout.
    pub download_timeout_secs: u64,

    /// Per-request timeout for extraction-service calls in seconds. Default: 60.
    ///
    /// Bounds each HTTP exchange, not the extraction job as a whole; the
    /// job is bounded by `poll.timeout`. `0` disables the timeout.
    pub request_timeout_secs: u64,

    /// Status polling behaviour.
    pub poll: PollPolicy,

    /// Directory that receives downloaded inputs. `None` uses a temporary
    /// directory that is removed when the run ends.
    pub work_dir: Option<PathBuf>,

    /// Register the extraction graph before uploading. Default: true.
    ///
    /// Disable when the graph is managed elsewhere and already exists.
    pub create_graph: bool,

    /// Treat an already registered graph of the same name as success.
    /// Default: false, which fails the run instead.
    ///
    /// The server keeps its existing definition, so local changes to the
    /// model, credential or policies are not applied when reusing.
    pub reuse_existing_graph: bool,

    /// Receives per-phase progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            download_timeout_secs: 120,
            request_timeout_secs: 60,
            poll: PollPolicy::default(),
            work_dir: None,
            create_graph: true,
            reuse_existing_graph: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("server_url", &self.server_url)
            .field("namespace", &self.namespace)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("poll", &self.poll)
            .field("work_dir", &self.work_dir)
            .field("create_graph", &self.create_graph)
            .field("reuse_existing_graph", &self.reuse_existing_graph)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn TranslationProgressCallback>"),
            )
            .finish()
    }
}

impl TranslationConfig {
    /// Create a new builder for `TranslationConfig`.
    pub fn builder() -> TranslationConfigBuilder {
        TranslationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`TranslationConfig`].
#[derive(Debug)]
pub struct TranslationConfigBuilder {
    config: TranslationConfig,
}

impl TranslationConfigBuilder {
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Download timeout in seconds; `0` disables it.
    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Per-request timeout in seconds; `0` disables it.
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll.initial_interval = Duration::from_millis(ms);
        self
    }

    pub fn max_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll.max_interval = Duration::from_millis(ms);
        self
    }

    /// Polling deadline in seconds; `0` waits without limit.
    pub fn poll_timeout_secs(mut self, secs: u64) -> Self {
        self.config.poll.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    pub fn poll_policy(mut self, policy: PollPolicy) -> Self {
        self.config.poll = policy;
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.work_dir = Some(dir.into());
        self
    }

    pub fn create_graph(mut self, v: bool) -> Self {
        self.config.create_graph = v;
        self
    }

    pub fn reuse_existing_graph(mut self, v: bool) -> Self {
        self.config.reuse_existing_graph = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TranslationConfig, TranslateError> {
        let c = &self.config;
        if !(c.server_url.starts_with("http://") || c.server_url.starts_with("https://")) {
            return Err(TranslateError::InvalidConfig(format!(
                "server URL must start with http:// or https://, got '{}'",
                c.server_url
            )));
        }
        if c.namespace.trim().is_empty() {
            return Err(TranslateError::InvalidConfig("namespace is empty".into()));
        }
        if c.poll.initial_interval.is_zero() {
            return Err(TranslateError::InvalidConfig(
                "poll interval must be > 0".into(),
            ));
        }
        if c.poll.max_interval < c.poll.initial_interval {
            return Err(TranslateError::InvalidConfig(format!(
                "max poll interval ({:?}) is shorter than the initial interval ({:?})",
                c.poll.max_interval, c.poll.initial_interval
            )));
        }
        Ok(self.config)
    }
}
