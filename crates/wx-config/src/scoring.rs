//! Scoring engine tuning.
//!
//! None of these constants has a derivation behind it; they are exposed as
//! configuration so they can be tuned without touching the engine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Weights of the proxy reward used when no observed reward is supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PseudoRewardWeights {
    pub dryness: f64,
    pub promo_strength: f64,
    pub spend_today: f64,
}

impl Default for PseudoRewardWeights {
    fn default() -> Self {
        Self {
            dryness: 0.6,
            promo_strength: 0.3,
            spend_today: 0.1,
        }
    }
}

/// Prior/online blending and UCB parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScoringConfig {
    /// Ridge parameter λ; new online states start at A = λI.
    pub ridge_lambda: f64,

    /// Exploration α for direct UCB queries.
    pub default_alpha: f64,

    /// Exploration α used by the orchestrator's hedged score.
    pub online_alpha: f64,

    /// Weight of the prior mean in the prior/online blend.
    pub prior_weight: f64,

    /// Weight of the online UCB in the final hedged score; the blended
    /// mean gets the remainder.
    pub ucb_weight: f64,

    /// Minimum prior pool size before online estimates are blended in.
    pub anonymity_pool_floor: u32,

    /// Confidence reported when scoring from the prior alone.
    pub prior_only_confidence: f64,

    /// Confidence reported for a prior/online blend.
    pub blended_confidence: f64,

    pub pseudo_reward: PseudoRewardWeights,

    /// Spend normalizers assumed when the caller omits them.
    pub default_spend_today: f64,
    pub default_spend_7d: f64,

    /// Recent samples needed before 7-day trend features are computed.
    pub min_history: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ridge_lambda: 5.0,
            default_alpha: 1.2,
            online_alpha: 1.1,
            prior_weight: 0.5,
            ucb_weight: 0.5,
            anonymity_pool_floor: 5,
            prior_only_confidence: 0.6,
            blended_confidence: 0.75,
            pseudo_reward: PseudoRewardWeights::default(),
            default_spend_today: 0.5,
            default_spend_7d: 0.5,
            min_history: 3,
        }
    }
}

/// Cohort registry lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum live cohorts; the least recently used is evicted beyond
    /// this. `None` keeps every cohort for the registry's lifetime.
    pub max_cohorts: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let c = ScoringConfig::default();
        assert_eq!(c.ridge_lambda, 5.0);
        assert_eq!(c.anonymity_pool_floor, 5);
        assert!(c.prior_only_confidence <= c.blended_confidence);
        let w = &c.pseudo_reward;
        assert!((w.dryness + w.promo_strength + w.spend_today - 1.0).abs() < 1e-12);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: ScoringConfig = serde_json::from_str(r#"{"ridge_lambda": 2.0}"#).unwrap();
        assert_eq!(c.ridge_lambda, 2.0);
        assert_eq!(c.online_alpha, 1.1);
        assert_eq!(c.min_history, 3);
    }

    #[test]
    fn registry_unbounded_by_default() {
        assert!(RegistryConfig::default().max_cohorts.is_none());
    }
}
