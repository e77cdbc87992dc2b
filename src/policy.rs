//! Model capability policy.
//!
//! Some model families reject any non-default sampling temperature, and only
//! some support the JSON-object response-format constraint. Capabilities
//! change as providers ship new families, so the policy lives in updatable
//! configuration (a YAML file) rather than inline logic; the built-in
//! defaults cover the families current at release time.
//!
//! Matching is by name prefix, so point releases (`gpt-5.1`, `o3-mini`)
//! inherit their family's entry.

use serde::Deserialize;
use std::error::Error;
use std::path::Path;

/// Capability lists keyed by model-name prefix.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelPolicy {
    /// Families that accept only the default sampling temperature. Requests
    /// to these models must omit the parameter entirely.
    #[serde(default)]
    pub fixed_temperature: Vec<String>,
    /// Families that honor `response_format: {"type": "json_object"}` on the
    /// chat-completion endpoint. Others get the constraint via prompt alone.
    #[serde(default)]
    pub json_mode: Vec<String>,
}

impl Default for ModelPolicy {
    fn default() -> Self {
        Self {
            fixed_temperature: vec![
                "gpt-5".to_string(),
                "o1".to_string(),
                "o3".to_string(),
                "o4".to_string(),
            ],
            json_mode: vec![
                "gpt-4".to_string(),
                "gpt-5".to_string(),
                "gpt-4o".to_string(),
            ],
        }
    }
}

impl ModelPolicy {
    /// Load a policy from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let policy: ModelPolicy = serde_yaml::from_str(&contents)?;
        Ok(policy)
    }

    /// Whether a request to `model` may carry a temperature parameter.
    pub fn allows_temperature(&self, model: &str) -> bool {
        !matches_family(&self.fixed_temperature, model)
    }

    /// Whether `model` supports the JSON-object response-format constraint.
    pub fn supports_json_mode(&self, model: &str) -> bool {
        matches_family(&self.json_mode, model)
    }
}

fn matches_family(families: &[String], model: &str) -> bool {
    families.iter().any(|family| model.starts_with(family.as_str()))
}
