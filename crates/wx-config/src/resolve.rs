//! Configuration resolution.
//!
//! Precedence: explicit path → `WX_CONFIG` → user config directory →
//! preset (if requested) → built-in defaults. An explicit or environment
//! path that does not exist is an error; a missing user file is not.

use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::Config;
use crate::preset::{get_preset, PresetName};
use crate::snapshot::{ConfigSnapshot, ConfigSource};
use crate::validate::ValidationError;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "WX_CONFIG";

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "weather_intel";

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Candidate locations, gathered before any file is read.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub explicit: Option<PathBuf>,
    pub env: Option<PathBuf>,
    pub user: Option<PathBuf>,
    pub preset: Option<PresetName>,
}

impl ConfigPaths {
    /// Discover candidates from the environment and platform directories.
    pub fn discover(explicit: Option<PathBuf>, preset: Option<PresetName>) -> Self {
        let env = std::env::var_os(CONFIG_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let user = dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
        Self {
            explicit,
            env,
            user,
            preset,
        }
    }
}

/// A validated configuration and its provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: Config,
    pub snapshot: ConfigSnapshot,
}

/// Resolve and validate configuration.
pub fn resolve_config(paths: &ConfigPaths) -> Result<ResolvedConfig, ValidationError> {
    let (config, source) = if let Some(path) = &paths.explicit {
        (Config::from_file(path)?, ConfigSource::Explicit { path: path.clone() })
    } else if let Some(path) = &paths.env {
        (Config::from_file(path)?, ConfigSource::Env { path: path.clone() })
    } else if let Some(path) = paths.user.as_ref().filter(|p| p.is_file()) {
        (Config::from_file(path)?, ConfigSource::User { path: path.clone() })
    } else if let Some(preset) = paths.preset {
        debug!(preset = %preset, "no config file found; using preset");
        (
            get_preset(preset),
            ConfigSource::Preset {
                name: preset.to_string(),
            },
        )
    } else {
        debug!("no config file found; using defaults");
        (Config::default(), ConfigSource::Defaults)
    };

    let snapshot = ConfigSnapshot::capture(&config, source)?;
    info!(source = ?snapshot.source, sha256 = %snapshot.sha256, "configuration resolved");
    Ok(ResolvedConfig { config, snapshot })
}
