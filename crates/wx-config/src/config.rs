//! Top-level configuration document.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::policy::{RecommendPolicy, SafetyPolicy, StagingPolicy};
use crate::priors::NetworkPriors;
use crate::scoring::{RegistryConfig, ScoringConfig};
use crate::validate::{validate_config, ValidationError};

/// Complete configuration. Every section is optional in the file and
/// falls back to its defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub staging: StagingPolicy,

    #[serde(default)]
    pub safety: SafetyPolicy,

    #[serde(default)]
    pub recommend: RecommendPolicy,

    #[serde(default)]
    pub priors: NetworkPriors,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            description: None,
            scoring: ScoringConfig::default(),
            registry: RegistryConfig::default(),
            staging: StagingPolicy::default(),
            safety: SafetyPolicy::default(),
            recommend: RecommendPolicy::default(),
            priors: NetworkPriors::default(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| ValidationError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse_json(&content)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, ValidationError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_config(self)
    }

    /// Canonical JSON used for hashing and `config show`.
    pub fn to_canonical_json(&self) -> Result<String, ValidationError> {
        Ok(serde_json::to_string(self)?)
    }

    /// JSON Schema for the configuration file.
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Config)).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_is_all_defaults() {
        let config = Config::parse_json("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn section_override() {
        let config =
            Config::parse_json(r#"{"staging": {"max_daily": 0.1}, "scoring": {"online_alpha": 2.0}}"#)
                .unwrap();
        assert_eq!(config.staging.max_daily, 0.1);
        assert_eq!(config.staging.horizon, 3);
        assert_eq!(config.scoring.online_alpha, 2.0);
    }

    #[test]
    fn invalid_json_rejected() {
        assert!(Config::parse_json("{not json").is_err());
    }

    #[test]
    fn semantic_errors_rejected() {
        let err = Config::parse_json(r#"{"scoring": {"ridge_lambda": 0}}"#).unwrap_err();
        assert!(err.to_string().contains("ridge_lambda"));
    }

    #[test]
    fn from_file_reads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"description": "test", "safety": {{"min_days": 5}}}}"#).unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.description.as_deref(), Some("test"));
        assert_eq!(config.safety.min_days, 5);
    }

    #[test]
    fn from_file_missing_reports_path() {
        let err = Config::from_file(Path::new("/nonexistent/wx/config.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/wx/config.json"));
    }

    #[test]
    fn schema_mentions_sections() {
        let schema = Config::json_schema().to_string();
        assert!(schema.contains("scoring"));
        assert!(schema.contains("priors"));
    }
}
