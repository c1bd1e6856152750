//! Feature vector construction.
//!
//! Maps one weather observation plus scenario knobs into the 21 named
//! dimensions of [`wx_common::FEATURE_NAMES`]. The order of
//! [`FeatureVector::to_array`] is the contract with learned coefficient
//! vectors and must never change.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wx_common::{Derived, FallbackReason, FEATURE_DIM};
use wx_math::{clamp, clamp01};

use crate::forecast::DailyForecast;
use crate::meteorology::{
    dew_point_anomaly_f, dew_point_f, dryness_index, hdd, rh_anomaly, vpd_kpa,
};

pub const DEFAULT_TEMP_F: f64 = 65.0;
pub const DEFAULT_RH_PCT: f64 = 55.0;
pub const DEFAULT_PRECIP_IN: f64 = 0.0;

/// Recent samples needed for the 7-day trend features.
pub const DEFAULT_MIN_HISTORY: usize = 3;

/// What-if adjustments, each nominally in [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub temp_adj: f64,
    pub precip_adj: f64,
    pub promo_adj: f64,
    pub campaign_adj: f64,
    pub ad_spend_adj: f64,
}

impl Scenario {
    /// Temperature after the scenario's multiplicative adjustment.
    pub fn adjusted_temp_f(&self, temp_f: f64) -> f64 {
        temp_f * (1.0 + self.temp_adj * 0.15)
    }

    pub fn adjusted_precip_in(&self, precip_in: f64) -> f64 {
        (precip_in + self.precip_adj * 0.5).max(0.0)
    }
}

/// Current conditions; any field may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temp_f: Option<f64>,
    pub rh_pct: Option<f64>,
    pub precip_in: Option<f64>,
}

impl WeatherObservation {
    pub fn new(temp_f: f64, rh_pct: f64, precip_in: f64) -> Self {
        Self {
            temp_f: Some(temp_f),
            rh_pct: Some(rh_pct),
            precip_in: Some(precip_in),
        }
    }
}

impl From<&DailyForecast> for WeatherObservation {
    fn from(day: &DailyForecast) -> Self {
        Self::new(day.temp_f, day.rh_pct, day.precip_in)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecentSample {
    pub temp_f: f64,
    pub rh_pct: f64,
}

impl From<&DailyForecast> for RecentSample {
    fn from(day: &DailyForecast) -> Self {
        Self {
            temp_f: day.temp_f,
            rh_pct: day.rh_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureInput {
    pub weather: WeatherObservation,
    pub scenario: Option<Scenario>,
    pub spend_today: f64,
    pub spend_7d: f64,
    pub date: NaiveDate,
    pub promo_active: bool,
    pub campaign_active: bool,
    /// Oldest first.
    pub recent: Vec<RecentSample>,
}

impl FeatureInput {
    pub fn new(weather: WeatherObservation, date: NaiveDate) -> Self {
        Self {
            weather,
            scenario: None,
            spend_today: 0.5,
            spend_7d: 0.5,
            date,
            promo_active: false,
            campaign_active: false,
            recent: Vec::new(),
        }
    }
}

/// The 21 named features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub temp_f: f64,
    pub rh_pct: f64,
    pub precip_in: f64,
    pub dew_point_f: f64,
    pub vpd_kpa: f64,
    pub hdd: f64,
    pub rh_anom: f64,
    pub dp_anom_f: f64,
    pub dryness: f64,
    pub dryness_trend: f64,
    pub weekend: f64,
    pub promo_active: f64,
    pub promo_strength: f64,
    pub campaign_active: f64,
    pub campaign_strength: f64,
    pub spend_today: f64,
    pub spend_7d: f64,
    pub vpd_times_hdd: f64,
    pub weekend_times_promo: f64,
    pub dryness_momentum_7d: f64,
    pub comfort_shock_7d: f64,
}

impl FeatureVector {
    /// Canonical ordering, aligned with `FEATURE_NAMES`.
    pub fn to_array(&self) -> [f64; FEATURE_DIM] {
        [
            self.temp_f,
            self.rh_pct,
            self.precip_in,
            self.dew_point_f,
            self.vpd_kpa,
            self.hdd,
            self.rh_anom,
            self.dp_anom_f,
            self.dryness,
            self.dryness_trend,
            self.weekend,
            self.promo_active,
            self.promo_strength,
            self.campaign_active,
            self.campaign_strength,
            self.spend_today,
            self.spend_7d,
            self.vpd_times_hdd,
            self.weekend_times_promo,
            self.dryness_momentum_7d,
            self.comfort_shock_7d,
        ]
    }
}

/// A feature vector plus every fallback applied while building it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltFeatures {
    pub vector: FeatureVector,
    pub fallbacks: Vec<FallbackReason>,
}

impl BuiltFeatures {
    pub fn is_degraded(&self) -> bool {
        !self.fallbacks.is_empty()
    }
}

fn observed(
    value: Option<f64>,
    default: f64,
    missing: FallbackReason,
    field: &str,
) -> Derived<f64> {
    match value {
        Some(v) if v.is_finite() => Derived::computed(v),
        Some(_) => Derived::defaulted(
            default,
            FallbackReason::NonFiniteInput {
                field: field.to_string(),
            },
        ),
        None => Derived::defaulted(default, missing),
    }
}

/// 7-day dryness momentum and comfort shock from oldest→newest samples.
fn recent_trends(recent: &[RecentSample], min_history: usize) -> Derived<(f64, f64)> {
    let need = min_history.max(2);
    if recent.len() < need {
        return Derived::defaulted(
            (0.0, 0.0),
            FallbackReason::InsufficientHistory {
                have: recent.len(),
                need,
            },
        );
    }
    let (first, last) = (recent[0], recent[recent.len() - 1]);
    let momentum = vpd_kpa(last.temp_f, last.rh_pct) - vpd_kpa(first.temp_f, first.rh_pct);
    let shock = last.temp_f - first.temp_f;
    Derived::computed((
        clamp(momentum / 2.5, -1.0, 1.0),
        clamp(shock / 20.0, -1.0, 1.0),
    ))
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

pub fn build_feature_vector(input: &FeatureInput) -> BuiltFeatures {
    build_feature_vector_with(input, DEFAULT_MIN_HISTORY)
}

/// Build features, requiring `min_history` recent samples for trends.
pub fn build_feature_vector_with(input: &FeatureInput, min_history: usize) -> BuiltFeatures {
    let mut fallbacks = Vec::new();
    let mut take = |d: Derived<f64>| {
        if let Some(reason) = d.reason() {
            fallbacks.push(reason.clone());
        }
        d.into_value()
    };

    let w = &input.weather;
    let mut temp_f = take(observed(
        w.temp_f,
        DEFAULT_TEMP_F,
        FallbackReason::MissingTemperature,
        "temp_f",
    ));
    let rh_pct = take(observed(
        w.rh_pct,
        DEFAULT_RH_PCT,
        FallbackReason::MissingHumidity,
        "rh_pct",
    ));
    let mut precip_in = take(observed(
        w.precip_in,
        DEFAULT_PRECIP_IN,
        FallbackReason::MissingPrecipitation,
        "precip_in",
    ));

    let scenario = input.scenario.unwrap_or_default();
    if input.scenario.is_some() {
        temp_f = scenario.adjusted_temp_f(temp_f);
        precip_in = scenario.adjusted_precip_in(precip_in);
    }

    let month0 = input.date.month0() as usize;
    let weekend = flag(matches!(input.date.weekday(), Weekday::Sat | Weekday::Sun));

    let dp = dew_point_f(temp_f, rh_pct);
    let vpd = vpd_kpa(temp_f, rh_pct);
    let heat_deficit = hdd(temp_f);
    let dryness = dryness_index(temp_f, rh_pct, month0);
    // Finite-difference proxy against a 2°F cooler reading.
    let dryness_trend = clamp(
        dryness - dryness_index(temp_f - 2.0, rh_pct, month0),
        -1.0,
        1.0,
    );

    let promo_strength = clamp01(scenario.promo_adj);
    let campaign_strength = clamp01(scenario.campaign_adj);

    let trends = recent_trends(&input.recent, min_history);
    if let Some(reason) = trends.reason() {
        if input.recent.is_empty() {
            debug!(%reason, "no recent history; trend features zeroed");
        } else {
            warn!(%reason, "trend features zeroed");
        }
        fallbacks.push(reason.clone());
    }
    let (dryness_momentum_7d, comfort_shock_7d) = trends.into_value();

    for reason in fallbacks.iter().filter(|r| {
        !matches!(r, FallbackReason::InsufficientHistory { .. })
    }) {
        warn!(%reason, "weather field defaulted");
    }

    BuiltFeatures {
        vector: FeatureVector {
            temp_f,
            rh_pct,
            precip_in,
            dew_point_f: dp,
            vpd_kpa: vpd,
            hdd: heat_deficit,
            rh_anom: rh_anomaly(rh_pct, month0),
            dp_anom_f: dew_point_anomaly_f(dp, month0),
            dryness,
            dryness_trend,
            weekend,
            promo_active: flag(input.promo_active || promo_strength > 0.0),
            promo_strength,
            campaign_active: flag(input.campaign_active || campaign_strength > 0.0),
            campaign_strength,
            spend_today: clamp01(input.spend_today * (1.0 + scenario.ad_spend_adj * 0.5)),
            spend_7d: clamp01(input.spend_7d),
            vpd_times_hdd: vpd * heat_deficit,
            weekend_times_promo: weekend * promo_strength,
            dryness_momentum_7d,
            comfort_shock_7d,
        },
        fallbacks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wx_common::{Feature, FEATURE_NAMES};

    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 18).unwrap()
    }

    #[test]
    fn array_matches_names() {
        let built = build_feature_vector(&FeatureInput::new(
            WeatherObservation::new(38.0, 30.0, 0.0),
            wednesday(),
        ));
        let x = built.vector.to_array();
        assert_eq!(x.len(), FEATURE_NAMES.len());
        assert_eq!(x[Feature::TempF.index()], 38.0);
        assert_eq!(x[Feature::RhPct.index()], 30.0);
        assert_eq!(x[Feature::Hdd.index()], 27.0);
        assert_eq!(x[Feature::VpdKpa.index()], built.vector.vpd_kpa);
        assert_eq!(x[Feature::ComfortShock7d.index()], 0.0);
    }

    #[test]
    fn missing_fields_default_and_are_reported() {
        let built = build_feature_vector(&FeatureInput::new(
            WeatherObservation::default(),
            wednesday(),
        ));
        assert_eq!(built.vector.temp_f, DEFAULT_TEMP_F);
        assert_eq!(built.vector.rh_pct, DEFAULT_RH_PCT);
        assert_eq!(built.vector.precip_in, 0.0);
        assert!(built.fallbacks.contains(&FallbackReason::MissingTemperature));
        assert!(built.fallbacks.contains(&FallbackReason::MissingHumidity));
        assert!(built.fallbacks.contains(&FallbackReason::MissingPrecipitation));
    }

    #[test]
    fn non_finite_input_is_defaulted() {
        let built = build_feature_vector(&FeatureInput::new(
            WeatherObservation::new(f64::NAN, 40.0, 0.1),
            wednesday(),
        ));
        assert_eq!(built.vector.temp_f, DEFAULT_TEMP_F);
        assert!(built.fallbacks.contains(&FallbackReason::NonFiniteInput {
            field: "temp_f".to_string()
        }));
        assert!(built.vector.to_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn scenario_adjustments() {
        let mut input = FeatureInput::new(WeatherObservation::new(60.0, 50.0, 0.1), wednesday());
        input.scenario = Some(Scenario {
            temp_adj: 1.0,
            precip_adj: -1.0,
            promo_adj: 0.4,
            campaign_adj: 2.0,
            ad_spend_adj: 1.0,
        });
        let v = build_feature_vector(&input).vector;
        assert!((v.temp_f - 69.0).abs() < 1e-12);
        assert_eq!(v.precip_in, 0.0);
        assert_eq!(v.promo_strength, 0.4);
        assert_eq!(v.promo_active, 1.0);
        assert_eq!(v.campaign_strength, 1.0);
        assert!((v.spend_today - 0.75).abs() < 1e-12);
    }

    #[test]
    fn explicit_flags_without_strength() {
        let mut input = FeatureInput::new(WeatherObservation::new(60.0, 50.0, 0.0), wednesday());
        input.promo_active = true;
        let v = build_feature_vector(&input).vector;
        assert_eq!(v.promo_active, 1.0);
        assert_eq!(v.promo_strength, 0.0);
        assert_eq!(v.campaign_active, 0.0);
    }

    #[test]
    fn weekend_interaction() {
        let mut input = FeatureInput::new(WeatherObservation::new(60.0, 50.0, 0.0), saturday());
        input.scenario = Some(Scenario {
            promo_adj: 0.5,
            ..Scenario::default()
        });
        let v = build_feature_vector(&input).vector;
        assert_eq!(v.weekend, 1.0);
        assert_eq!(v.weekend_times_promo, 0.5);
    }

    #[test]
    fn short_history_zeroes_trends() {
        let mut input = FeatureInput::new(WeatherObservation::new(40.0, 30.0, 0.0), wednesday());
        input.recent = vec![
            RecentSample {
                temp_f: 30.0,
                rh_pct: 60.0,
            },
            RecentSample {
                temp_f: 50.0,
                rh_pct: 20.0,
            },
        ];
        let built = build_feature_vector(&input);
        assert_eq!(built.vector.dryness_momentum_7d, 0.0);
        assert_eq!(built.vector.comfort_shock_7d, 0.0);
        assert!(built
            .fallbacks
            .contains(&FallbackReason::InsufficientHistory { have: 2, need: 3 }));
    }

    #[test]
    fn trends_from_history() {
        let mut input = FeatureInput::new(WeatherObservation::new(40.0, 30.0, 0.0), wednesday());
        input.recent = vec![
            RecentSample {
                temp_f: 30.0,
                rh_pct: 60.0,
            },
            RecentSample {
                temp_f: 35.0,
                rh_pct: 50.0,
            },
            RecentSample {
                temp_f: 40.0,
                rh_pct: 30.0,
            },
        ];
        let built = build_feature_vector(&input);
        assert!((built.vector.comfort_shock_7d - 0.5).abs() < 1e-12);
        assert!(built.vector.dryness_momentum_7d > 0.0);
        assert!(!built
            .fallbacks
            .iter()
            .any(|r| matches!(r, FallbackReason::InsufficientHistory { .. })));
    }

    #[test]
    fn interaction_is_product() {
        let v = build_feature_vector(&FeatureInput::new(
            WeatherObservation::new(38.0, 30.0, 0.0),
            wednesday(),
        ))
        .vector;
        assert!((v.vpd_times_hdd - v.vpd_kpa * v.hdd).abs() < 1e-12);
        assert!((-1.0..=1.0).contains(&v.dryness_trend));
    }
}
