//! Rollout policy: budget staging, forecast safety gate, and automation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Rate limits for staging a budget multiplier over several days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StagingPolicy {
    pub start: f64,
    pub horizon: usize,
    /// Maximum relative move per day (fraction of the current multiplier).
    pub max_daily: f64,
    /// Absolute multiplier bounds.
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for StagingPolicy {
    fn default() -> Self {
        Self {
            start: 1.0,
            horizon: 3,
            max_daily: 0.15,
            floor: 0.5,
            ceiling: 3.0,
        }
    }
}

/// Forecast volatility thresholds and damping factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SafetyPolicy {
    /// Days inspected; shorter forecasts are reported as degraded.
    pub min_days: usize,
    pub insufficient_damping: f64,

    pub gust_mph: f64,
    pub gust_damping: f64,

    pub precip_probability: f64,
    pub precip_damping: f64,

    pub temp_range_f: f64,
    pub temp_range_damping: f64,

    /// Normalizers for the entropy proxy.
    pub gust_norm_mph: f64,
    pub temp_range_norm_f: f64,

    /// Entropy proxy above which automation halts.
    pub halt_entropy: f64,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self {
            min_days: 3,
            insufficient_damping: 0.8,
            gust_mph: 26.0,
            gust_damping: 0.8,
            precip_probability: 0.6,
            precip_damping: 0.85,
            temp_range_f: 20.0,
            temp_range_damping: 0.9,
            gust_norm_mph: 35.0,
            temp_range_norm_f: 25.0,
            halt_entropy: 0.85,
        }
    }
}

/// Recommendation assembly and automation gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RecommendPolicy {
    /// Display confidence at or above which automation applies a change.
    pub automation_threshold: f64,
    /// Recommendations returned per brand.
    pub max_picks: usize,
    /// Audit entries retained.
    pub audit_capacity: usize,
}

impl Default for RecommendPolicy {
    fn default() -> Self {
        Self {
            automation_threshold: 0.82,
            max_picks: 2,
            audit_capacity: 100,
        }
    }
}
