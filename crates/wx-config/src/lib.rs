//! Weather intelligence configuration loading and validation.
//!
//! This crate provides:
//! - Network priors as data (category keyword table, climate nudges)
//! - Scoring, registry, staging, safety, and recommendation tuning
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation
//! - Config snapshots for output provenance
//! - Configuration presets

pub mod config;
pub mod policy;
pub mod preset;
pub mod priors;
pub mod resolve;
pub mod scoring;
pub mod snapshot;
pub mod validate;

pub use config::Config;
pub use policy::{RecommendPolicy, SafetyPolicy, StagingPolicy};
pub use preset::{get_preset, list_presets, PresetError, PresetInfo, PresetName};
pub use priors::{CategoryProfile, ClimateNudge, NetworkPriors, Prior};
pub use resolve::{resolve_config, ConfigPaths, ResolvedConfig};
pub use scoring::{PseudoRewardWeights, RegistryConfig, ScoringConfig};
pub use snapshot::{ConfigSnapshot, ConfigSource};
pub use validate::{ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Longest staging horizon or forecast window, in days.
pub const MAX_SPAN_DAYS: usize = 366;
