//! # pdf-translate
//!
//! Translate PDF documents by handing them to an extraction-pipeline service
//! whose graph runs a hosted LLM over the file.
//!
//! The crate owns no model and parses no PDF. It defines the pipeline
//! declaratively, gets the document to the service, waits for the job and
//! reads the result back as text.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF (URL or path)
//!  │
//!  ├─ 1. Input    download to a local file
//!  ├─ 2. Graph    register the extraction graph (one LLM policy)
//!  ├─ 3. Upload   multipart POST → content id
//!  ├─ 4. Wait     poll task outcomes with capped backoff and a deadline
//!  └─ 5. Decode   fetch the policy's first artifact, UTF-8 decode
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_translate::{translate_remote, ExtractionGraph, TranslationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let graph = ExtractionGraph::pdf_translator("gpt-4o", std::env::var("OPENAI_API_KEY")?);
//!     let config = TranslationConfig::default();
//!     let output = translate_remote("https://arxiv.org/pdf/2310.06825.pdf", &graph, &config).await?;
//!     println!("{}", pdf_translate::preview(&output.text, 1000));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-translate` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod graph;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod service;
pub mod translate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PollPolicy, TranslationConfig, TranslationConfigBuilder};
pub use error::TranslateError;
pub use graph::{ExtractionGraph, ExtractionPolicy, PolicyParams};
pub use output::{TranslationOutput, TranslationStats};
pub use pipeline::decode::{decode_first_artifact, fetch_text, preview};
pub use pipeline::input::download_file;
pub use pipeline::poll::wait_for_completion;
pub use progress::{NoopProgressCallback, ProgressCallback, TranslationProgressCallback};
pub use service::{Artifact, ContentId, ContentStatus, ExtractionService, HttpExtractionService};
pub use translate::{translate, translate_remote, translate_sync, translate_to_file};
