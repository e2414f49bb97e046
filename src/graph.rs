//! Declarative pipeline definition: the extraction graph.
//!
//! An extraction graph is a named, ordered list of extraction policies. Each
//! policy binds an extractor hosted by the extraction service to a model, a
//! credential and an instruction. The graph is pure data; it is sent to the
//! service once and never changes for the lifetime of a session.
//!
//! The YAML form is the one the service accepts:
//!
//! ```yaml
//! name: pdf_translator
//! extraction_policies:
//!   - extractor: tensorlake/openai
//!     name: pdf_to_french
//!     input_params:
//!       model_name: gpt-4o
//!       key: YOUR_OPENAI_API_KEY
//!       system_prompt: Translate the content of the following PDF ...
//! ```

use crate::error::TranslateError;
use crate::prompts::{translation_prompt, DEFAULT_SOURCE_LANGUAGE, DEFAULT_TRANSLATION_PROMPT};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Graph name used by the bundled PDF translator.
pub const DEFAULT_GRAPH_NAME: &str = "pdf_translator";

/// Policy name used by the bundled PDF translator.
pub const DEFAULT_POLICY_NAME: &str = "pdf_to_french";

/// Extractor that forwards documents to an OpenAI-compatible model.
pub const DEFAULT_EXTRACTOR: &str = "tensorlake/openai";

/// Model used when none is specified.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Placeholder credential written into generated graphs.
pub const PLACEHOLDER_KEY: &str = "YOUR_OPENAI_API_KEY";

/// A named pipeline of extraction policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionGraph {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub extraction_policies: Vec<ExtractionPolicy>,
}

/// One processing step of an [`ExtractionGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionPolicy {
    /// Extractor identifier on the service, e.g. `tensorlake/openai`.
    pub extractor: String,

    /// Step name, unique within the graph.
    pub name: String,

    pub input_params: PolicyParams,

    /// Name of an upstream policy whose output feeds this one.
    /// `None` means the policy consumes the uploaded file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_source: Option<String>,
}

/// Parameters forwarded verbatim to the extractor.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyParams {
    pub model_name: String,
    pub key: String,
    pub system_prompt: String,
}

impl fmt::Debug for PolicyParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyParams")
            .field("model_name", &self.model_name)
            .field("key", &"<redacted>")
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}

impl ExtractionGraph {
    /// The bundled translator graph: one `tensorlake/openai` policy named
    /// `pdf_to_french` carrying the default instruction.
    pub fn pdf_translator(model: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: DEFAULT_GRAPH_NAME.to_string(),
            description: None,
            extraction_policies: vec![ExtractionPolicy {
                extractor: DEFAULT_EXTRACTOR.to_string(),
                name: DEFAULT_POLICY_NAME.to_string(),
                input_params: PolicyParams {
                    model_name: model.into(),
                    key: key.into(),
                    system_prompt: DEFAULT_TRANSLATION_PROMPT.to_string(),
                },
                content_source: None,
            }],
        }
    }

    /// Translator graph for an arbitrary target language.
    ///
    /// The policy is named `pdf_to_<language>` and the graph
    /// `pdf_translator_<language>`, both in lowercase. Graph names are keys
    /// on the service, so each language gets its own. The French variant is
    /// identical to [`ExtractionGraph::pdf_translator`].
    pub fn translator_for(
        language: &str,
        model: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        let mut graph = Self::pdf_translator(model, key);
        let slug = language_slug(language);
        if slug == "french" {
            return graph;
        }
        graph.name = format!("{DEFAULT_GRAPH_NAME}_{slug}");
        let policy = &mut graph.extraction_policies[0];
        policy.name = format!("pdf_to_{slug}");
        policy.input_params.system_prompt = translation_prompt(DEFAULT_SOURCE_LANGUAGE, language.trim());
        graph
    }

    /// Parse a graph from its YAML form and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self, TranslateError> {
        let graph: Self =
            serde_yaml::from_str(yaml).map_err(|e| TranslateError::InvalidGraph(e.to_string()))?;
        graph.validate()?;
        Ok(graph)
    }

    /// Load a graph from a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TranslateError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TranslateError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => TranslateError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => TranslateError::InvalidGraph(format!("{}: {e}", path.display())),
        })?;
        Self::from_yaml(&yaml)
    }

    /// Serialise to YAML.
    pub fn to_yaml(&self) -> Result<String, TranslateError> {
        serde_yaml::to_string(self).map_err(|e| TranslateError::InvalidGraph(e.to_string()))
    }

    /// Look up a policy by name.
    pub fn policy(&self, name: &str) -> Option<&ExtractionPolicy> {
        self.extraction_policies.iter().find(|p| p.name == name)
    }

    /// The step whose output is read back after extraction: the last policy
    /// in declaration order.
    pub fn output_policy(&self) -> Option<&ExtractionPolicy> {
        self.extraction_policies.last()
    }

    /// Replace the credential on every policy.
    pub fn with_key(mut self, key: &str) -> Self {
        for policy in &mut self.extraction_policies {
            policy.input_params.key = key.to_string();
        }
        self
    }

    /// Replace the model on every policy.
    pub fn with_model(mut self, model: &str) -> Self {
        for policy in &mut self.extraction_policies {
            policy.input_params.model_name = model.to_string();
        }
        self
    }

    /// Fail if any policy still carries an empty or placeholder credential.
    ///
    /// The service stores the graph as sent, so registering it with
    /// [`PLACEHOLDER_KEY`] leaves a graph that can never run.
    pub fn ensure_credentials(&self) -> Result<(), TranslateError> {
        for policy in &self.extraction_policies {
            let key = policy.input_params.key.trim();
            if key.is_empty() || key == PLACEHOLDER_KEY {
                return Err(TranslateError::InvalidGraph(format!(
                    "policy '{}' has no API key (set OPENAI_API_KEY or pass --api-key)",
                    policy.name
                )));
            }
        }
        Ok(())
    }

    /// Check structural constraints the service would otherwise reject.
    pub fn validate(&self) -> Result<(), TranslateError> {
        if self.name.trim().is_empty() {
            return Err(TranslateError::InvalidGraph("graph name is empty".into()));
        }
        if self.extraction_policies.is_empty() {
            return Err(TranslateError::InvalidGraph(format!(
                "graph '{}' has no extraction policies",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for policy in &self.extraction_policies {
            if policy.name.trim().is_empty() {
                return Err(TranslateError::InvalidGraph(format!(
                    "graph '{}' has a policy with an empty name",
                    self.name
                )));
            }
            if policy.extractor.trim().is_empty() {
                return Err(TranslateError::InvalidGraph(format!(
                    "policy '{}' names no extractor",
                    policy.name
                )));
            }
            if !seen.insert(policy.name.as_str()) {
                return Err(TranslateError::InvalidGraph(format!(
                    "duplicate policy name '{}'",
                    policy.name
                )));
            }
        }

        // Sources must point at a policy declared earlier.
        let mut declared = HashSet::new();
        for policy in &self.extraction_policies {
            if let Some(ref source) = policy.content_source {
                if !declared.contains(source.as_str()) {
                    return Err(TranslateError::InvalidGraph(format!(
                        "policy '{}' reads from unknown or later policy '{}'",
                        policy.name, source
                    )));
                }
            }
            declared.insert(policy.name.as_str());
        }

        Ok(())
    }
}

/// `"Brazilian Portuguese"` -> `"brazilian_portuguese"`.
fn language_slug(language: &str) -> String {
    language
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}
