//! Pipeline stages for a translation run.
//!
//! Each submodule implements exactly one step so each can be tested on its
//! own against a fake [`crate::service::ExtractionService`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ upload ──▶ poll ──▶ decode
//! (URL/path)  (service)  (wait)   (artifact → UTF-8)
//! ```
//!
//! 1. [`input`]  — download a URL (or accept a local path) to a local file
//! 2. upload     — a single [`crate::service::ExtractionService::upload_file`] call
//! 3. [`poll`]   — wait for the service to report completion, with backoff
//!    and a deadline
//! 4. [`decode`] — fetch the step's artifacts and decode the first as UTF-8

pub mod decode;
pub mod input;
pub mod poll;
