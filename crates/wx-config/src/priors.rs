//! Network prior configuration.
//!
//! A prior is a hand-authored coefficient vector over the fixed feature
//! contract, plus a spread and a pool size. The pool size stands in for the
//! number of anonymous observations backing the prior; the scoring engine
//! refuses to blend in online estimates when it is below the anonymity floor.
//!
//! Category matching is data, not code: profiles are tried in declared order
//! and the first profile with a keyword contained (case-insensitively) in the
//! category name wins. Climate nudges are additive and keyed by the
//! snake_case climate names of `ClimateZone` / `ClimateArchetype`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wx_common::{Feature, FEATURE_DIM};

/// Resolved prior for one (category, climate) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prior {
    /// Name of the matched profile, `None` when no keyword matched.
    pub profile: Option<String>,
    /// Mean coefficients in canonical feature order.
    pub mu: Vec<f64>,
    pub sigma: f64,
    pub pool_size: u32,
}

impl Prior {
    /// Coefficient for a named feature.
    pub fn coefficient(&self, feature: Feature) -> f64 {
        self.mu.get(feature.index()).copied().unwrap_or(0.0)
    }
}

/// A category behavior profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryProfile {
    pub name: String,

    /// Lowercase keywords matched as substrings of the category name.
    pub keywords: Vec<String>,

    /// Non-zero coefficients; unspecified features stay 0.
    #[serde(default)]
    pub coefficients: BTreeMap<Feature, f64>,

    pub sigma: f64,

    pub pool_size: u32,
}

impl CategoryProfile {
    pub fn matches(&self, category: &str) -> bool {
        let category = category.to_lowercase();
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && category.contains(&k.to_lowercase()))
    }
}

/// Additive coefficient adjustment applied for a set of climates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClimateNudge {
    pub climates: Vec<String>,
    pub adjustments: BTreeMap<Feature, f64>,
}

impl ClimateNudge {
    pub fn applies_to(&self, climate: &str) -> bool {
        self.climates.iter().any(|c| c == climate)
    }
}

/// Complete network prior table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkPriors {
    #[serde(default = "default_sigma")]
    pub default_sigma: f64,

    #[serde(default = "default_pool_size")]
    pub default_pool_size: u32,

    #[serde(default)]
    pub profiles: Vec<CategoryProfile>,

    #[serde(default)]
    pub climate_nudges: Vec<ClimateNudge>,
}

fn default_sigma() -> f64 {
    0.6
}

fn default_pool_size() -> u32 {
    3
}

impl NetworkPriors {
    /// First profile whose keywords match the category.
    pub fn profile_for(&self, category: &str) -> Option<&CategoryProfile> {
        self.profiles.iter().find(|p| p.matches(category))
    }

    /// Resolve the prior for a category in a climate.
    pub fn prior_for(&self, category: &str, climate: &str) -> Prior {
        let mut mu = vec![0.0; FEATURE_DIM];
        let (profile, sigma, pool_size) = match self.profile_for(category) {
            Some(p) => {
                for (feature, value) in &p.coefficients {
                    mu[feature.index()] = *value;
                }
                (Some(p.name.clone()), p.sigma, p.pool_size)
            }
            None => (None, self.default_sigma, self.default_pool_size),
        };

        for nudge in self.climate_nudges.iter().filter(|n| n.applies_to(climate)) {
            for (feature, delta) in &nudge.adjustments {
                mu[feature.index()] += *delta;
            }
        }

        Prior {
            profile,
            mu,
            sigma,
            pool_size,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.default_sigma.is_finite() && self.default_sigma > 0.0) {
            return Err("default_sigma must be positive".to_string());
        }
        for p in &self.profiles {
            if p.keywords.is_empty() || p.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(format!("profile '{}' has an empty keyword", p.name));
            }
            if !(p.sigma.is_finite() && p.sigma > 0.0) {
                return Err(format!("profile '{}' sigma must be positive", p.name));
            }
            if p.coefficients.values().any(|v| !v.is_finite()) {
                return Err(format!("profile '{}' has a non-finite coefficient", p.name));
            }
        }
        for n in &self.climate_nudges {
            if n.adjustments.values().any(|v| !v.is_finite()) {
                return Err("climate nudge has a non-finite adjustment".to_string());
            }
        }
        Ok(())
    }
}

impl Default for NetworkPriors {
    fn default() -> Self {
        let profile = |name: &str,
                       keywords: &[&str],
                       coefficients: &[(Feature, f64)],
                       sigma: f64,
                       pool_size: u32| CategoryProfile {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            coefficients: coefficients.iter().copied().collect(),
            sigma,
            pool_size,
        };

        Self {
            default_sigma: default_sigma(),
            default_pool_size: default_pool_size(),
            profiles: vec![
                // Lower RH and dew point read as a stronger signal.
                profile(
                    "humidity",
                    &["humidifier", "indoor", "winter"],
                    &[
                        (Feature::VpdKpa, 0.35),
                        (Feature::DpAnomF, -0.1),
                        (Feature::RhAnom, -0.12),
                        (Feature::Hdd, 0.08),
                        (Feature::Dryness, 0.25),
                        (Feature::DrynessTrend, 0.12),
                        (Feature::VpdTimesHdd, 0.15),
                    ],
                    0.45,
                    7,
                ),
                profile(
                    "warm_weather",
                    &["summer", "outdoor"],
                    &[
                        (Feature::TempF, 0.18),
                        (Feature::VpdKpa, 0.12),
                        (Feature::Weekend, 0.06),
                        (Feature::WeekendTimesPromo, 0.08),
                    ],
                    0.55,
                    6,
                ),
                profile(
                    "rain",
                    &["rain"],
                    &[(Feature::PrecipIn, 0.25), (Feature::RhAnom, 0.08)],
                    0.5,
                    5,
                ),
            ],
            climate_nudges: vec![
                ClimateNudge {
                    climates: vec![
                        "humid_continental".to_string(),
                        "marine_west".to_string(),
                        "marine_west_coast".to_string(),
                    ],
                    adjustments: [(Feature::Hdd, 0.05), (Feature::TempF, 0.04)]
                        .into_iter()
                        .collect(),
                },
                ClimateNudge {
                    climates: vec!["humid_subtropical".to_string(), "tropical".to_string()],
                    adjustments: [(Feature::RhAnom, -0.05), (Feature::VpdKpa, 0.05)]
                        .into_iter()
                        .collect(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn winter_matches_humidity_profile() {
        let priors = NetworkPriors::default();
        let prior = priors.prior_for("Winter", "semi_arid");
        assert_eq!(prior.profile.as_deref(), Some("humidity"));
        assert_eq!(prior.pool_size, 7);
        assert!(approx(prior.sigma, 0.45));
        assert!(approx(prior.coefficient(Feature::VpdKpa), 0.35));
        assert!(approx(prior.coefficient(Feature::RhAnom), -0.12));
        assert!(approx(prior.coefficient(Feature::TempF), 0.0));
    }

    #[test]
    fn first_matching_profile_wins() {
        // "indoor" precedes "outdoor" in declared order.
        let priors = NetworkPriors::default();
        let prior = priors.prior_for("indoor-outdoor", "arid");
        assert_eq!(prior.profile.as_deref(), Some("humidity"));
    }

    #[test]
    fn unmatched_category_is_all_zero_with_defaults() {
        let priors = NetworkPriors::default();
        let prior = priors.prior_for("wellness", "arid");
        assert!(prior.profile.is_none());
        assert!(prior.mu.iter().all(|v| *v == 0.0));
        assert_eq!(prior.pool_size, 3);
        assert!(approx(prior.sigma, 0.6));
        assert_eq!(prior.mu.len(), FEATURE_DIM);
    }

    #[test]
    fn continental_nudge_adds_to_hdd_and_temp() {
        let priors = NetworkPriors::default();
        let prior = priors.prior_for("winter", "humid_continental");
        assert!(approx(prior.coefficient(Feature::Hdd), 0.13));
        assert!(approx(prior.coefficient(Feature::TempF), 0.04));
    }

    #[test]
    fn subtropical_nudge_adjusts_rh_and_vpd() {
        let priors = NetworkPriors::default();
        let prior = priors.prior_for("rain", "humid_subtropical");
        assert!(approx(prior.coefficient(Feature::RhAnom), 0.03));
        assert!(approx(prior.coefficient(Feature::VpdKpa), 0.05));
    }

    #[test]
    fn nudges_apply_even_without_profile() {
        let priors = NetworkPriors::default();
        let prior = priors.prior_for("wellness", "marine_west");
        assert!(approx(prior.coefficient(Feature::Hdd), 0.05));
    }

    #[test]
    fn serde_roundtrip_keeps_feature_keys() {
        let priors = NetworkPriors::default();
        let json = serde_json::to_string(&priors).unwrap();
        assert!(json.contains("\"vpd_kpa\""));
        let back: NetworkPriors = serde_json::from_str(&json).unwrap();
        assert_eq!(back, priors);
    }

    #[test]
    fn validate_rejects_empty_keyword() {
        let mut priors = NetworkPriors::default();
        priors.profiles[0].keywords.push("  ".to_string());
        assert!(priors.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_finite_coefficient() {
        let mut priors = NetworkPriors::default();
        priors.profiles[1]
            .coefficients
            .insert(Feature::TempF, f64::NAN);
        assert!(priors.validate().is_err());
    }
}
