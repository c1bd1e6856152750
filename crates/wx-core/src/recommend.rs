//! Budget recommendations for a brand.
//!
//! Every brand category is scored, mapped to a bounded budget multiplier,
//! and staged. The best category is returned with at most one seasonally
//! compatible follow-up.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info, warn};
use wx_common::{GeoCohort, Result};
use wx_config::{Config, RecommendPolicy};
use wx_math::{clamp, round_to, SeededStream};

use crate::audit::{AuditEntry, AuditLog};
use crate::brands::Brand;
use crate::decision::{stage_plan, SafetyState, StagedPlan};
use crate::features::{FeatureVector, Scenario, WeatherObservation, DEFAULT_TEMP_F};
use crate::scoring::{ScoreInput, ScoringEngine};

const MIN_MULTIPLIER: f64 = 1.0;
const MAX_MULTIPLIER: f64 = 2.0;
const IRRELEVANT_PENALTY: f64 = 0.2;
const DISPLAY_CONFIDENCE_MIN: f64 = 0.55;
const DISPLAY_CONFIDENCE_MAX: f64 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonGroup {
    Winter,
    Summer,
    Neutral,
}

impl SeasonGroup {
    pub fn of(category: &str) -> Self {
        let c = category.to_lowercase();
        if c.contains("winter") {
            SeasonGroup::Winter
        } else if c.contains("summer") {
            SeasonGroup::Summer
        } else {
            SeasonGroup::Neutral
        }
    }

    /// Winter and summer never share a recommendation set.
    pub fn compatible(self, other: SeasonGroup) -> bool {
        self == SeasonGroup::Neutral || other == SeasonGroup::Neutral || self == other
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub weather: WeatherObservation,
    pub scenario: Option<Scenario>,
    pub date: NaiveDate,
    pub geo: Option<GeoCohort>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub products: Vec<String>,
    pub action: String,
    /// Rounded to two places.
    pub budget_multiplier: f64,
    pub expected_lift: String,
    pub confidence: f64,
    pub reasoning: String,
    pub relevant: bool,
    pub season: SeasonGroup,
    pub mean_score: f64,
    pub ucb_score: f64,
    pub prior_pool: u32,
    pub staged: StagedPlan,
}

/// Map mean and UCB scores to a multiplier in [1, 2].
pub fn budget_multiplier(mean: f64, ucb: f64) -> f64 {
    let base = 1.0 + mean.max(0.0) * 0.2;
    let ucb_adj = 1.0 + ucb.max(0.0) * 0.15;
    clamp(0.6 * base + 0.4 * ucb_adj, MIN_MULTIPLIER, MAX_MULTIPLIER)
}

/// Whether current conditions favor a category at all.
pub fn is_relevant(category: &str, adjusted_temp_f: f64, precip_in: f64) -> bool {
    let c = category.to_lowercase();
    if c.contains("winter") {
        adjusted_temp_f < 55.0
    } else if c.contains("summer") {
        adjusted_temp_f > 65.0
    } else if c.contains("rain") {
        precip_in > 0.05
    } else {
        true
    }
}

fn reasoning(f: &FeatureVector) -> String {
    let mut parts = Vec::new();
    if f.dryness > 0.6 {
        parts.push("Indoor air is unusually dry");
    }
    if f.hdd > 5.0 {
        parts.push("Heating demand is up (HDD high)");
    }
    if f.promo_strength > 0.2 {
        parts.push("Promotions active");
    }
    if f.campaign_strength > 0.2 {
        parts.push("Paid channels pushed");
    }
    if parts.is_empty() {
        parts.push("Weather favorable vs baseline");
    }
    parts.join(" · ")
}

fn percent(m: f64, scale: f64) -> i64 {
    ((m - 1.0) * scale).round() as i64
}

/// Highest multiplier first, then the first compatible follow-up.
fn select(mut scored: Vec<Recommendation>, max_picks: usize) -> Vec<Recommendation> {
    scored.sort_by(|a, b| {
        b.budget_multiplier
            .partial_cmp(&a.budget_multiplier)
            .unwrap_or(Ordering::Equal)
    });
    let mut iter = scored.into_iter();
    let Some(top) = iter.next() else {
        return Vec::new();
    };
    let group = top.season;
    let mut picks = vec![top];
    picks.extend(iter.filter(|r| group.compatible(r.season)).take(max_picks.saturating_sub(1)));
    picks.truncate(max_picks.max(1));
    picks
}

pub fn recommend(
    engine: &mut ScoringEngine,
    config: &Config,
    brand: &Brand,
    request: &RecommendRequest,
) -> Result<Vec<Recommendation>> {
    let scenario = request.scenario.unwrap_or_default();
    let adjusted_temp = scenario.adjusted_temp_f(request.weather.temp_f.unwrap_or(DEFAULT_TEMP_F));
    let precip = request.weather.precip_in.unwrap_or(0.0);

    let mut scored = Vec::with_capacity(brand.categories.len());
    for category in brand.categories {
        let mut input = ScoreInput::new(
            brand.brand_key(),
            brand.location,
            category.key,
            request.weather,
            request.date,
        );
        input.scenario = request.scenario;
        input.geo = request.geo.clone();
        let prediction = engine.score_category(&input)?;

        let relevant = is_relevant(category.key, adjusted_temp, precip);
        let mut multiplier = budget_multiplier(prediction.mean, prediction.ucb);
        if !relevant {
            multiplier = (multiplier - IRRELEVANT_PENALTY).max(MIN_MULTIPLIER);
        }

        let mut rnd = SeededStream::from_key(&format!("{}:{}", prediction.cohort, request.date));
        let confidence = clamp(
            prediction.confidence - 0.05 + rnd.next_f64() * 0.1,
            DISPLAY_CONFIDENCE_MIN,
            DISPLAY_CONFIDENCE_MAX,
        );

        let staged = stage_plan(multiplier, &config.staging);
        debug!(category = category.key, multiplier, relevant, confidence, "category recommended");

        scored.push(Recommendation {
            category: category.key.to_string(),
            products: category.products.iter().map(|p| p.to_string()).collect(),
            action: format!(
                "Increase {} by {}% · {}",
                category.key,
                percent(multiplier, 100.0),
                staged.narrative
            ),
            budget_multiplier: round_to(multiplier, 2),
            expected_lift: format!("+{}%", percent(multiplier, 40.0)),
            confidence,
            reasoning: reasoning(&prediction.features),
            relevant,
            season: SeasonGroup::of(category.key),
            mean_score: prediction.mean,
            ucb_score: prediction.ucb,
            prior_pool: prediction.prior_pool,
            staged,
        });
    }

    Ok(select(scored, config.recommend.max_picks))
}

/// Apply every recommendation at or above the automation threshold unless
/// the safety gate has halted. Returns the number applied.
pub fn automate(
    recommendations: &[Recommendation],
    policy: &RecommendPolicy,
    safety: &SafetyState,
    log: &mut AuditLog,
) -> usize {
    if safety.is_halted() {
        warn!(reasons = ?safety.reasons, "automation halted by safety gate");
        return 0;
    }
    let mut applied = 0;
    for rec in recommendations
        .iter()
        .filter(|r| r.confidence >= policy.automation_threshold)
    {
        log.record(AuditEntry::new(
            rec.category.clone(),
            "Auto-apply staged change",
            rec.budget_multiplier,
            rec.staged.steps.clone(),
            rec.confidence,
        ));
        applied += 1;
    }
    if applied > 0 {
        info!(applied, threshold = policy.automation_threshold, "staged changes auto-applied");
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brands::find_brand;
    use crate::decision::{SafetyReason, SafetyStatus};

    fn request(temp_f: f64, rh: f64, precip: f64) -> RecommendRequest {
        RecommendRequest {
            weather: WeatherObservation::new(temp_f, rh, precip),
            scenario: None,
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            geo: Some(GeoCohort::state("NY")),
        }
    }

    fn rec(category: &str, multiplier: f64, confidence: f64) -> Recommendation {
        Recommendation {
            category: category.to_string(),
            products: vec![],
            action: String::new(),
            budget_multiplier: multiplier,
            expected_lift: String::new(),
            confidence,
            reasoning: String::new(),
            relevant: true,
            season: SeasonGroup::of(category),
            mean_score: 0.0,
            ucb_score: 0.0,
            prior_pool: 7,
            staged: stage_plan(multiplier, &Default::default()),
        }
    }

    #[test]
    fn multiplier_bounds() {
        assert_eq!(budget_multiplier(-5.0, -5.0), 1.0);
        assert_eq!(budget_multiplier(100.0, 100.0), 2.0);
        assert!((budget_multiplier(1.0, 1.0) - 1.18).abs() < 1e-12);
    }

    #[test]
    fn relevance_rules() {
        assert!(is_relevant("winter", 40.0, 0.0));
        assert!(!is_relevant("winter", 60.0, 0.0));
        assert!(is_relevant("summer", 70.0, 0.0));
        assert!(!is_relevant("rain", 70.0, 0.01));
        assert!(is_relevant("wellness", 10.0, 0.0));
    }

    #[test]
    fn season_compatibility() {
        assert!(!SeasonGroup::Winter.compatible(SeasonGroup::Summer));
        assert!(SeasonGroup::Winter.compatible(SeasonGroup::Neutral));
        assert!(SeasonGroup::Neutral.compatible(SeasonGroup::Summer));
    }

    #[test]
    fn selection_skips_opposite_season() {
        let picks = select(
            vec![
                rec("summer", 1.2, 0.8),
                rec("winter", 1.6, 0.8),
                rec("indoor", 1.1, 0.8),
            ],
            2,
        );
        let cats: Vec<_> = picks.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(cats, vec!["winter", "indoor"]);
    }

    #[test]
    fn selection_without_compatible_follow_up() {
        let picks = select(vec![rec("summer", 1.2, 0.8), rec("winter", 1.6, 0.8)], 2);
        assert_eq!(picks.len(), 1);
        assert!(select(vec![], 2).is_empty());
    }

    #[test]
    fn canopy_winter_leads_in_dry_cold() {
        let config = Config::default();
        let mut engine = ScoringEngine::new(&config);
        let canopy = find_brand("canopy").unwrap();
        let recs = recommend(&mut engine, &config, canopy, &request(38.0, 30.0, 0.0)).unwrap();
        assert!(!recs.is_empty() && recs.len() <= 2);
        assert_eq!(recs[0].category, "winter");
        assert!(recs[0].budget_multiplier > 1.0);
        assert!(recs[0].reasoning.contains("Heating demand"));
        assert!(recs[0].action.starts_with("Increase winter by "));
        assert!(recs.iter().all(|r| r.season != SeasonGroup::Summer));
        for r in &recs {
            assert!((0.55..=0.99).contains(&r.confidence));
        }
    }

    #[test]
    fn recommendations_are_reproducible() {
        let config = Config::default();
        let canopy = find_brand("canopy").unwrap();
        let a = recommend(
            &mut ScoringEngine::new(&config),
            &config,
            canopy,
            &request(38.0, 30.0, 0.0),
        )
        .unwrap();
        let b = recommend(
            &mut ScoringEngine::new(&config),
            &config,
            canopy,
            &request(38.0, 30.0, 0.0),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn automation_respects_threshold_and_halt() {
        let recs = vec![rec("winter", 1.3, 0.9), rec("indoor", 1.1, 0.7)];
        let policy = RecommendPolicy::default();
        let mut log = AuditLog::new(policy.audit_capacity);
        let ok = SafetyState {
            status: SafetyStatus::Ok,
            reasons: vec![],
            damping: 1.0,
            entropy: Some(0.1),
        };
        assert_eq!(automate(&recs, &policy, &ok, &mut log), 1);
        assert_eq!(log.recent(10)[0].category, "winter");

        let halted = SafetyState {
            status: SafetyStatus::Halt,
            reasons: vec![SafetyReason::ForecastEntropyHigh],
            damping: 0.0,
            entropy: Some(0.95),
        };
        assert_eq!(automate(&recs, &policy, &halted, &mut log), 0);
        assert_eq!(log.len(), 1);
    }
}
