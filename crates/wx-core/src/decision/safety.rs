//! Forecast safety gate.
//!
//! Rule-based circuit breaker over the next few forecast days. Soft
//! triggers multiply a damping factor; an entropy proxy above the halt
//! threshold forces damping to zero.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use wx_config::SafetyPolicy;
use wx_math::clamp01;

use crate::forecast::{temp_range_f, DailyForecast};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SafetyStatus {
    Ok,
    Degraded,
    Halt,
}

impl fmt::Display for SafetyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SafetyStatus::Ok => "OK",
            SafetyStatus::Degraded => "DEGRADED",
            SafetyStatus::Halt => "HALT",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyReason {
    InsufficientForecast,
    WindGusts,
    PrecipProbability,
    TempWhiplash,
    ForecastEntropyHigh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyState {
    pub status: SafetyStatus,
    pub reasons: Vec<SafetyReason>,
    /// Multiplier applied to staged changes, in [0, 1].
    pub damping: f64,
    /// Risk summary over the inspected window; absent when too short.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy: Option<f64>,
}

impl SafetyState {
    pub fn is_halted(&self) -> bool {
        self.status == SafetyStatus::Halt
    }
}

pub fn compute_safety(forecast: &[DailyForecast], policy: &SafetyPolicy) -> SafetyState {
    let window = policy.min_days.max(1);
    if forecast.len() < window {
        warn!(days = forecast.len(), need = window, "forecast too short for safety gate");
        return SafetyState {
            status: SafetyStatus::Degraded,
            reasons: vec![SafetyReason::InsufficientForecast],
            damping: policy.insufficient_damping,
            entropy: None,
        };
    }

    let next = &forecast[..window];
    let gust_max = next.iter().map(|d| d.gust_mph).fold(0.0, f64::max);
    let pop_max = next.iter().map(|d| d.pop).fold(0.0, f64::max);
    let temp_range = temp_range_f(next, window);

    let mut reasons = Vec::new();
    let mut damping = 1.0;
    if gust_max > policy.gust_mph {
        reasons.push(SafetyReason::WindGusts);
        damping *= policy.gust_damping;
    }
    if pop_max > policy.precip_probability {
        reasons.push(SafetyReason::PrecipProbability);
        damping *= policy.precip_damping;
    }
    if temp_range > policy.temp_range_f {
        reasons.push(SafetyReason::TempWhiplash);
        damping *= policy.temp_range_damping;
    }

    let entropy = clamp01(
        (pop_max
            + (gust_max / policy.gust_norm_mph).min(1.0)
            + (temp_range / policy.temp_range_norm_f).min(1.0))
            / 3.0,
    );

    let status = if entropy > policy.halt_entropy {
        reasons.push(SafetyReason::ForecastEntropyHigh);
        damping = 0.0;
        SafetyStatus::Halt
    } else if reasons.is_empty() {
        SafetyStatus::Ok
    } else {
        SafetyStatus::Degraded
    };

    debug!(%status, gust_max, pop_max, temp_range, entropy, damping, "safety evaluated");
    SafetyState {
        status,
        reasons,
        damping,
        entropy: Some(entropy),
    }
}
