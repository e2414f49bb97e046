//! Instruction strings sent to the model backend through the extraction graph.
//!
//! The prompt is part of the pipeline definition: it travels inside
//! [`crate::graph::PolicyParams::system_prompt`] and the extraction service
//! forwards it to the model. Nothing in this crate calls the model directly.

/// Default source language of input documents.
pub const DEFAULT_SOURCE_LANGUAGE: &str = "English";

/// Default target language of the translation.
pub const DEFAULT_TARGET_LANGUAGE: &str = "French";

/// Default instruction for translating a PDF from English to French.
///
/// Equal to `translation_prompt(DEFAULT_SOURCE_LANGUAGE, DEFAULT_TARGET_LANGUAGE)`.
pub const DEFAULT_TRANSLATION_PROMPT: &str = "Translate the content of the following PDF from English to French. \
Maintain the original formatting and structure as much as possible. \
Provide the translation in plain text format.";

/// Build the translation instruction for an arbitrary language pair.
pub fn translation_prompt(source: &str, target: &str) -> String {
    format!(
        "Translate the content of the following PDF from {source} to {target}. \
Maintain the original formatting and structure as much as possible. \
Provide the translation in plain text format."
    )
}
