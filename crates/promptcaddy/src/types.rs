//! Core data types for prompts and their parameters.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// File extension recognized as a prompt source.
pub const PROMPT_EXTENSION: &str = "md";

/// Type tag used when a parameter does not declare one.
pub const DEFAULT_PARAMETER_TYPE: &str = "string";

/// One named input a prompt accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub description: String,
    #[serde(rename = "type", default, deserialize_with = "scalar_string")]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
}

/// Structured metadata decoded from a prompt file's front matter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptMeta {
    #[serde(default, deserialize_with = "scalar_string")]
    pub id: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub title: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub description: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

/// A parsed prompt. Built once per reload pass and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Prompt {
    pub id: String,
    pub title: String,
    pub description: String,
    pub version: String,
    pub parameters: Vec<ParameterSpec>,
    /// Template text containing `{{name}}` placeholders.
    pub body: String,
    /// Where the prompt was loaded from. Diagnostic only.
    pub source: PathBuf,
}

impl Prompt {
    /// Assemble a prompt from decoded metadata and its body, enforcing
    /// parameter invariants.
    pub fn from_parts(meta: PromptMeta, body: String, source: PathBuf) -> CaddyResult<Self> {
        let mut parameters = Vec::with_capacity(meta.parameters.len());

        for mut param in meta.parameters {
            if param.name.is_empty() {
                return Err(CaddyError::InvalidPrompt(
                    "parameter with empty name".to_string(),
                ));
            }
            if parameters.iter().any(|p: &ParameterSpec| p.name == param.name) {
                return Err(CaddyError::InvalidPrompt(format!(
                    "duplicate parameter: {}",
                    param.name
                )));
            }
            if param.kind.is_empty() {
                param.kind = DEFAULT_PARAMETER_TYPE.to_string();
            }
            parameters.push(param);
        }

        Ok(Self {
            id: meta.id,
            title: meta.title,
            description: meta.description,
            version: meta.version,
            parameters,
            body,
            source,
        })
    }

    /// Look up a declared parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Accept any YAML scalar as text, so `version: 1.0` reads as `"1.0"`.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a scalar, found {other:?}"
        ))),
    }
}

/// Errors that can occur in the prompt library.
#[derive(thiserror::Error, Debug)]
pub enum CaddyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to scan prompt directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to parse frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse frontmatter: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse frontmatter: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse frontmatter: {0}")]
    FrontMatter(String),

    #[error("invalid prompt: {0}")]
    InvalidPrompt(String),

    #[error("required parameter missing: {0}")]
    MissingParameter(String),

    #[error("prompt not found: {0}")]
    PromptNotFound(String),

    #[error("failed to watch directory: {0}")]
    Watch(#[from] notify::Error),

    #[error("watcher error: {0}")]
    Watcher(String),
}

/// Convenience result type.
pub type CaddyResult<T> = Result<T, CaddyError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn meta_with(parameters: Vec<ParameterSpec>) -> PromptMeta {
        PromptMeta {
            id: "greet".to_string(),
            parameters,
            ..Default::default()
        }
    }

    fn param(name: &str, kind: &str) -> ParameterSpec {
        ParameterSpec {
            name: name.to_string(),
            description: String::new(),
            kind: kind.to_string(),
            required: false,
        }
    }

    #[test]
    fn test_default_parameter_type() {
        let prompt = Prompt::from_parts(
            meta_with(vec![param("name", ""), param("count", "number")]),
            String::new(),
            PathBuf::from("greet.md"),
        )
        .unwrap();

        assert_eq!(prompt.parameter("name").unwrap().kind, "string");
        assert_eq!(prompt.parameter("count").unwrap().kind, "number");
        assert!(prompt.parameter("missing").is_none());
    }

    #[test]
    fn test_rejects_duplicate_parameters() {
        let err = Prompt::from_parts(
            meta_with(vec![param("name", "string"), param("name", "string")]),
            String::new(),
            PathBuf::from("greet.md"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate parameter: name"));
    }

    #[test]
    fn test_rejects_empty_parameter_name() {
        let err = Prompt::from_parts(
            meta_with(vec![param("", "string")]),
            String::new(),
            PathBuf::from("greet.md"),
        )
        .unwrap_err();
        assert!(matches!(err, CaddyError::InvalidPrompt(_)));
    }

    #[test]
    fn test_scalar_metadata_fields() {
        let meta: PromptMeta =
            serde_yaml::from_str("id: 42\nversion: 1.0\ntitle: ~\nparameters: []\n").unwrap();
        assert_eq!(meta.id, "42");
        assert_eq!(meta.version, "1.0");
        assert_eq!(meta.title, "");
    }
}
