//! Prior/online coefficient blending.

use serde::{Deserialize, Serialize};
use wx_config::{Prior, ScoringConfig};

/// Which coefficients produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum BlendSource {
    /// Prior only: the prior pool is below the anonymity floor.
    PriorThinPool { pool_size: u32, floor: u32 },
    Blended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blend {
    pub theta: Vec<f64>,
    pub confidence: f64,
    pub source: BlendSource,
}

/// Blend prior mean with online θ, or fall back to the prior alone when
/// the pool is too thin. A fresh cohort's θ is zero, so it contributes
/// nothing but still halves the prior.
pub fn blend_prior_and_online(prior: &Prior, online: &[f64], config: &ScoringConfig) -> Blend {
    if prior.pool_size < config.anonymity_pool_floor {
        return Blend {
            theta: prior.mu.clone(),
            confidence: config.prior_only_confidence,
            source: BlendSource::PriorThinPool {
                pool_size: prior.pool_size,
                floor: config.anonymity_pool_floor,
            },
        };
    }

    let w = config.prior_weight;
    let theta = prior
        .mu
        .iter()
        .zip(online)
        .map(|(m, o)| w * m + (1.0 - w) * o)
        .collect();
    Blend {
        theta,
        confidence: config.blended_confidence,
        source: BlendSource::Blended,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prior(pool_size: u32) -> Prior {
        Prior {
            profile: Some("humidity".to_string()),
            mu: vec![1.0, -1.0, 0.5],
            sigma: 0.45,
            pool_size,
        }
    }

    #[test]
    fn untrained_online_halves_prior() {
        let b = blend_prior_and_online(&prior(7), &[0.0; 3], &ScoringConfig::default());
        assert_eq!(b.theta, vec![0.5, -0.5, 0.25]);
        assert_eq!(b.confidence, 0.75);
        assert_eq!(b.source, BlendSource::Blended);
    }

    #[test]
    fn thin_pool_ignores_online() {
        let online = [3.0, 3.0, 3.0];
        let b = blend_prior_and_online(&prior(3), &online, &ScoringConfig::default());
        assert_eq!(b.theta, vec![1.0, -1.0, 0.5]);
        assert_eq!(
            b.source,
            BlendSource::PriorThinPool {
                pool_size: 3,
                floor: 5
            }
        );
    }

    #[test]
    fn blends_half_and_half() {
        let online = [3.0, 1.0, 0.5];
        let b = blend_prior_and_online(&prior(5), &online, &ScoringConfig::default());
        assert_eq!(b.theta, vec![2.0, 0.0, 0.5]);
        assert_eq!(b.confidence, 0.75);
        assert_eq!(b.source, BlendSource::Blended);
    }

    #[test]
    fn blended_confidence_not_below_prior_only() {
        let cfg = ScoringConfig::default();
        let online = [0.0; 3];
        let thin = blend_prior_and_online(&prior(2), &online, &cfg);
        let full = blend_prior_and_online(&prior(9), &online, &cfg);
        assert!(thin.confidence <= full.confidence);
    }
}
