//! Per-category scoring.
//!
//! Combines the feature builder, network priors and a per-cohort online
//! learner:
//!
//! ```text
//!   θ_blend = w·μ_prior + (1-w)·θ_online      (μ_prior alone below the pool floor)
//!   mean    = θ_blend · x
//!   score   = u·UCB_online(x, α) + (1-u)·mean
//! ```
//!
//! The engine owns its [`CohortRegistry`]. Scoring and updating take
//! `&mut self`; a multi-threaded host serializes access by wrapping the
//! engine in a mutex.

pub mod blend;
pub mod registry;

pub use blend::{blend_prior_and_online, Blend, BlendSource};
pub use registry::{CohortRegistry, RegistryError, RegistrySnapshot};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wx_common::{
    BrandKey, ClimateZone, CohortKey, Error, FallbackReason, GeoCohort, Result, FEATURE_DIM,
};
use wx_config::{Config, NetworkPriors, ScoringConfig};
use wx_math::dot;

use crate::features::{
    build_feature_vector_with, FeatureInput, FeatureVector, RecentSample, Scenario,
    WeatherObservation,
};
use crate::geo::LatLng;
use crate::meteorology::climate_zone_for_lat_lng;

/// One category to score for one brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreInput {
    pub brand: BrandKey,
    /// Drives the climate used for the prior.
    pub location: LatLng,
    pub category: String,
    pub weather: WeatherObservation,
    pub scenario: Option<Scenario>,
    /// Falls back to the configured defaults when absent.
    pub spend_today: Option<f64>,
    pub spend_7d: Option<f64>,
    pub date: NaiveDate,
    pub promo_active: bool,
    pub campaign_active: bool,
    pub recent: Vec<RecentSample>,
    pub geo: Option<GeoCohort>,
}

impl ScoreInput {
    pub fn new(
        brand: BrandKey,
        location: LatLng,
        category: impl Into<String>,
        weather: WeatherObservation,
        date: NaiveDate,
    ) -> Self {
        Self {
            brand,
            location,
            category: category.into(),
            weather,
            scenario: None,
            spend_today: None,
            spend_7d: None,
            date,
            promo_active: false,
            campaign_active: false,
            recent: Vec::new(),
            geo: None,
        }
    }

    pub fn cohort_key(&self) -> CohortKey {
        CohortKey::new(&self.brand, &self.category, self.geo.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub cohort: CohortKey,
    pub features: FeatureVector,
    pub x: Vec<f64>,
    pub theta: Vec<f64>,
    pub mean: f64,
    pub ucb: f64,
    pub confidence: f64,
    pub prior_pool: u32,
    pub variance: f64,
    pub climate: ClimateZone,
    pub prior_profile: Option<String>,
    pub blend: BlendSource,
    /// Input fallbacks applied while building features.
    pub fallbacks: Vec<FallbackReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardSource {
    Observed,
    Pseudo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub cohort: CohortKey,
    pub reward: f64,
    pub reward_source: RewardSource,
    /// Observations folded into the cohort so far, including this one.
    pub updates: u64,
}

pub struct ScoringEngine {
    config: ScoringConfig,
    priors: NetworkPriors,
    registry: CohortRegistry,
}

impl ScoringEngine {
    pub fn new(config: &Config) -> Self {
        let registry = CohortRegistry::new(
            FEATURE_DIM,
            config.scoring.ridge_lambda,
            &config.registry,
        );
        Self::from_parts(config, registry)
    }

    /// Use a previously restored registry.
    pub fn with_registry(config: &Config, registry: CohortRegistry) -> Result<Self> {
        if registry.dim() != FEATURE_DIM {
            return Err(Error::DimensionMismatch {
                expected: FEATURE_DIM,
                actual: registry.dim(),
            });
        }
        Ok(Self::from_parts(config, registry))
    }

    fn from_parts(config: &Config, registry: CohortRegistry) -> Self {
        Self {
            config: config.scoring.clone(),
            priors: config.priors.clone(),
            registry,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn registry(&self) -> &CohortRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CohortRegistry {
        &mut self.registry
    }

    pub fn into_registry(self) -> CohortRegistry {
        self.registry
    }

    fn feature_input(&self, input: &ScoreInput) -> FeatureInput {
        FeatureInput {
            weather: input.weather,
            scenario: input.scenario,
            spend_today: input.spend_today.unwrap_or(self.config.default_spend_today),
            spend_7d: input.spend_7d.unwrap_or(self.config.default_spend_7d),
            date: input.date,
            promo_active: input.promo_active,
            campaign_active: input.campaign_active,
            recent: input.recent.clone(),
        }
    }

    pub fn score_category(&mut self, input: &ScoreInput) -> Result<PredictionResult> {
        let built = build_feature_vector_with(&self.feature_input(input), self.config.min_history);
        let x = built.vector.to_array().to_vec();
        let cohort = input.cohort_key();

        let climate = climate_zone_for_lat_lng(input.location.lat, input.location.lng);
        let prior = self.priors.prior_for(&input.category, climate.as_str());

        let state = self.registry.get_or_create(&cohort);
        let online_theta = state.theta();
        let online = state.ucb_score(&x, self.config.online_alpha)?;

        let blend = blend_prior_and_online(&prior, &online_theta, &self.config);
        let mean = dot(&blend.theta, &x);
        let w = self.config.ucb_weight;
        let ucb = w * online.ucb + (1.0 - w) * mean;

        debug!(
            cohort = %cohort,
            %climate,
            profile = ?prior.profile,
            source = ?blend.source,
            mean,
            ucb,
            "category scored"
        );

        Ok(PredictionResult {
            cohort,
            features: built.vector,
            x,
            theta: blend.theta,
            mean,
            ucb,
            confidence: blend.confidence,
            prior_pool: prior.pool_size,
            variance: online.variance,
            climate,
            prior_profile: prior.profile,
            blend: blend.source,
            fallbacks: built.fallbacks,
        })
    }

    /// Proxy reward from the current feature mix.
    pub fn pseudo_reward(&self, features: &FeatureVector) -> f64 {
        let w = &self.config.pseudo_reward;
        w.dryness * features.dryness
            + w.promo_strength * features.promo_strength
            + w.spend_today * features.spend_today
    }

    /// Fold an observed (or, when absent, pseudo) reward into the cohort.
    pub fn update_category(
        &mut self,
        input: &ScoreInput,
        reward: Option<f64>,
    ) -> Result<UpdateOutcome> {
        let scored = self.score_category(input)?;
        let (reward, reward_source) = match reward {
            Some(r) if r.is_finite() => (r, RewardSource::Observed),
            Some(r) => {
                return Err(Error::InvalidInput(format!("reward must be finite, got {r}")))
            }
            None => (self.pseudo_reward(&scored.features), RewardSource::Pseudo),
        };

        let state = self.registry.get_or_create(&scored.cohort);
        state.update(&scored.x, reward)?;
        let updates = state.updates();
        info!(cohort = %scored.cohort, reward, source = ?reward_source, updates, "cohort updated");

        Ok(UpdateOutcome {
            cohort: scored.cohort,
            reward,
            reward_source,
            updates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_YORK: LatLng = LatLng::new(40.7128, -74.0060);

    fn input(category: &str) -> ScoreInput {
        ScoreInput::new(
            BrandKey::new("canopy"),
            NEW_YORK,
            category,
            WeatherObservation::new(38.0, 30.0, 0.0),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        )
    }

    #[test]
    fn fresh_cohort_blends_untrained_state() {
        let config = Config::default();
        let mut engine = ScoringEngine::new(&config);
        let r = engine.score_category(&input("winter")).unwrap();
        assert_eq!(r.x.len(), FEATURE_DIM);
        assert_eq!(r.blend, BlendSource::Blended);
        assert_eq!(r.confidence, 0.75);
        assert_eq!(r.prior_pool, 7);
        assert_eq!(r.climate, ClimateZone::HumidContinental);
        assert!(r.mean > 0.0);
        assert_eq!(engine.registry().len(), 1);

        // Untrained θ is zero, so the blend halves the prior mean.
        let prior = config.priors.prior_for("winter", r.climate.as_str());
        assert!((r.mean - 0.5 * dot(&prior.mu, &r.x)).abs() < 1e-9);
    }

    #[test]
    fn update_then_blend() {
        let mut engine = ScoringEngine::new(&Config::default());
        let out = engine.update_category(&input("winter"), None).unwrap();
        assert_eq!(out.reward_source, RewardSource::Pseudo);
        assert_eq!(out.updates, 1);
        assert!(out.reward > 0.0 && out.reward <= 1.0);

        let r = engine.score_category(&input("winter")).unwrap();
        assert_eq!(r.blend, BlendSource::Blended);
        assert_eq!(r.confidence, 0.75);
    }

    #[test]
    fn thin_pool_stays_prior_only_after_updates() {
        let mut engine = ScoringEngine::new(&Config::default());
        let misc = input("Gift Cards");
        engine.update_category(&misc, Some(1.0)).unwrap();
        let r = engine.score_category(&misc).unwrap();
        assert_eq!(r.prior_pool, 3);
        assert!(matches!(r.blend, BlendSource::PriorThinPool { .. }));
        assert_eq!(r.confidence, 0.6);
    }

    #[test]
    fn cohorts_are_isolated_by_geo() {
        let mut engine = ScoringEngine::new(&Config::default());
        let mut ny = input("winter");
        ny.geo = Some(GeoCohort::state("NY"));
        engine.update_category(&ny, Some(0.9)).unwrap();

        let r = engine.score_category(&input("winter")).unwrap();
        assert_eq!(engine.registry().len(), 2);
        assert_eq!(engine.registry().peek(&r.cohort).map(|s| s.updates()), Some(0));
        assert_eq!(r.blend, BlendSource::Blended);
    }

    #[test]
    fn non_finite_reward_rejected() {
        let mut engine = ScoringEngine::new(&Config::default());
        let err = engine
            .update_category(&input("winter"), Some(f64::INFINITY))
            .unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn pseudo_reward_weights() {
        let engine = ScoringEngine::new(&Config::default());
        let mut engine_input = input("winter");
        engine_input.scenario = Some(Scenario {
            promo_adj: 1.0,
            ..Scenario::default()
        });
        let built = build_feature_vector_with(&engine.feature_input(&engine_input), 3);
        let r = engine.pseudo_reward(&built.vector);
        let expected = 0.6 * built.vector.dryness + 0.3 + 0.1 * 0.5;
        assert!((r - expected).abs() < 1e-12);
    }

    #[test]
    fn rejects_foreign_registry() {
        let registry = CohortRegistry::new(4, 5.0, &Default::default());
        assert!(ScoringEngine::with_registry(&Config::default(), registry).is_err());
    }
}
