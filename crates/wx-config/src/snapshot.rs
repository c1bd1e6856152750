//! Configuration snapshots embedded in outputs.
//!
//! The fingerprint is the SHA-256 of the canonical JSON, so two outputs
//! produced under identical configuration carry identical fingerprints
//! regardless of where the configuration came from.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::config::Config;
use crate::validate::ValidationError;

/// Where a resolved configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigSource {
    /// `--config` path.
    Explicit { path: PathBuf },
    /// `WX_CONFIG` environment variable.
    Env { path: PathBuf },
    /// User config directory.
    User { path: PathBuf },
    /// Built-in preset.
    Preset { name: String },
    /// Built-in defaults.
    Defaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub schema_version: String,
    pub source: ConfigSource,
    pub sha256: String,
}

impl ConfigSnapshot {
    pub fn capture(config: &Config, source: ConfigSource) -> Result<Self, ValidationError> {
        Ok(Self {
            schema_version: config.schema_version.clone(),
            source,
            sha256: fingerprint(config)?,
        })
    }

    pub fn using_defaults(&self) -> bool {
        matches!(self.source, ConfigSource::Defaults)
    }
}

/// SHA-256 hex digest of the canonical JSON.
pub fn fingerprint(config: &Config) -> Result<String, ValidationError> {
    let json = config.to_canonical_json()?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
