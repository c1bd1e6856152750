//! Configuration presets.
//!
//! - `demo`: reference defaults.
//! - `conservative`: slower ramps, earlier damping, stricter anonymity floor.
//! - `exploratory`: faster ramps and wider confidence bounds.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("unknown preset '{0}' (expected one of: demo, conservative, exploratory)")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetName {
    Demo,
    Conservative,
    Exploratory,
}

impl PresetName {
    pub const ALL: [PresetName; 3] = [
        PresetName::Demo,
        PresetName::Conservative,
        PresetName::Exploratory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PresetName::Demo => "demo",
            PresetName::Conservative => "conservative",
            PresetName::Exploratory => "exploratory",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PresetName::Demo => "Reference defaults",
            PresetName::Conservative => "Slow budget ramps, early safety damping, pool floor 7",
            PresetName::Exploratory => "Fast budget ramps and higher exploration",
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PresetError::Unknown(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PresetInfo {
    pub name: PresetName,
    pub description: &'static str,
}

pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|&name| PresetInfo {
            name,
            description: name.description(),
        })
        .collect()
}

pub fn get_preset(name: PresetName) -> Config {
    let mut config = Config::default();
    match name {
        PresetName::Demo => {}
        PresetName::Conservative => {
            config.description = Some("conservative preset".to_string());
            config.staging.max_daily = 0.08;
            config.scoring.anonymity_pool_floor = 7;
            config.scoring.online_alpha = 0.8;
            config.safety.gust_mph = 22.0;
            config.safety.precip_probability = 0.5;
            config.safety.temp_range_f = 15.0;
            config.safety.halt_entropy = 0.75;
            config.recommend.automation_threshold = 0.9;
        }
        PresetName::Exploratory => {
            config.description = Some("exploratory preset".to_string());
            config.staging.max_daily = 0.25;
            config.scoring.online_alpha = 1.6;
            config.scoring.default_alpha = 1.8;
        }
    }
    config
}
