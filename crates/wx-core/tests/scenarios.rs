//! End-to-end scenarios through the library API.

use chrono::NaiveDate;
use wx_common::{FallbackReason, GeoCohort};
use wx_config::{get_preset, Config, PresetName, SafetyPolicy};
use wx_core::audit::AuditLog;
use wx_core::brands::find_brand;
use wx_core::decision::{compute_safety, SafetyStatus};
use wx_core::features::WeatherObservation;
use wx_core::forecast::generate_forecast;
use wx_core::geo::{cells_for_metro, derive_states, find_state, metros_for_state};
use wx_core::recommend::{automate, recommend, RecommendRequest, SeasonGroup};
use wx_core::scoring::{BlendSource, CohortRegistry, ScoreInput, ScoringEngine};
use wx_math::dot;

fn jan15() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

fn canopy_input(category: &str) -> ScoreInput {
    let brand = find_brand("canopy").unwrap();
    ScoreInput::new(
        brand.brand_key(),
        brand.location,
        category,
        WeatherObservation::new(38.0, 30.0, 0.0),
        jan15(),
    )
}

#[test]
fn cold_dry_new_york_blends_fresh_winter_cohort() {
    let config = Config::default();
    let mut engine = ScoringEngine::new(&config);
    let winter = engine.score_category(&canopy_input("winter")).unwrap();

    assert_eq!(winter.confidence, 0.75);
    assert_eq!(winter.blend, BlendSource::Blended);
    assert!(winter.mean > 0.0);
    let prior = config.priors.prior_for("winter", winter.climate.as_str());
    assert!((winter.mean - 0.5 * dot(&prior.mu, &winter.x)).abs() < 1e-9);
    assert_eq!(winter.prior_profile.as_deref(), Some("humidity"));
    assert!(winter
        .fallbacks
        .iter()
        .all(|f| matches!(f, FallbackReason::InsufficientHistory { .. })));
}

#[test]
fn recommendations_never_mix_winter_and_summer() {
    let config = Config::default();
    let mut engine = ScoringEngine::new(&config);
    let brand = find_brand("canopy").unwrap();
    let request = RecommendRequest {
        weather: WeatherObservation::new(38.0, 30.0, 0.0),
        scenario: None,
        date: jan15(),
        geo: Some(GeoCohort::state("NY")),
    };
    let recs = recommend(&mut engine, &config, brand, &request).unwrap();

    assert!(!recs.is_empty() && recs.len() <= config.recommend.max_picks);
    let seasons: Vec<SeasonGroup> = recs.iter().map(|r| r.season).collect();
    assert!(!(seasons.contains(&SeasonGroup::Winter) && seasons.contains(&SeasonGroup::Summer)));
    for r in &recs {
        // Blended cohorts display 0.75 ± 0.05.
        if r.prior_pool >= config.scoring.anonymity_pool_floor {
            assert!(r.confidence >= 0.70 - 1e-12 && r.confidence <= 0.80 + 1e-12);
        }
        assert!(r.confidence >= 0.55 && r.confidence <= 0.99);
        assert_eq!(r.staged.steps.len(), config.staging.horizon);
    }

    // Same request, same answer.
    let mut fresh = ScoringEngine::new(&config);
    let again = recommend(&mut fresh, &config, brand, &request).unwrap();
    assert_eq!(recs, again);
}

#[test]
fn volatile_forecast_halts_automation() {
    let point = find_state("CO").unwrap().point();
    let mut days = generate_forecast(&point, jan15(), 3);
    for (i, d) in days.iter_mut().enumerate() {
        d.gust_mph = 40.0;
        d.pop = 0.9;
        d.temp_f = 30.0 + 15.0 * i as f64;
    }
    let safety = compute_safety(&days, &SafetyPolicy::default());
    assert_eq!(safety.status, SafetyStatus::Halt);
    assert_eq!(safety.damping, 0.0);

    let config = Config::default();
    let mut engine = ScoringEngine::new(&config);
    let brand = find_brand("canopy").unwrap();
    let request = RecommendRequest {
        weather: WeatherObservation::new(38.0, 30.0, 0.0),
        scenario: None,
        date: jan15(),
        geo: None,
    };
    let recs = recommend(&mut engine, &config, brand, &request).unwrap();
    let mut log = AuditLog::default();
    assert_eq!(automate(&recs, &config.recommend, &safety, &mut log), 0);
    assert!(log.is_empty());
}

#[test]
fn geography_is_reproducible() {
    let a = derive_states();
    let b = derive_states();
    assert_eq!(a, b);
    assert_eq!(a.len(), 51);

    for state in a.iter().take(10) {
        let metros = metros_for_state(state);
        assert_eq!(metros, metros_for_state(state));
        assert!((3..=6).contains(&metros.len()));
        for m in &metros {
            assert!(m.id.starts_with(&state.code));
            let cells = cells_for_metro(m);
            assert!((3..=5).contains(&cells.len()));
            assert!(cells.iter().all(|c| c.id.starts_with(&m.id)));
        }
    }
}

#[test]
fn registry_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("registry.json");
    let config = Config::default();

    let mut engine = ScoringEngine::new(&config);
    for _ in 0..3 {
        engine.update_category(&canopy_input("winter"), Some(0.8)).unwrap();
    }
    let before = engine.score_category(&canopy_input("winter")).unwrap();
    engine.registry().save(&path).unwrap();

    let registry = CohortRegistry::load(&path, &config.registry).unwrap();
    let mut restored = ScoringEngine::with_registry(&config, registry).unwrap();
    let after = restored.score_category(&canopy_input("winter")).unwrap();

    assert_eq!(before.cohort, after.cohort);
    assert!((before.mean - after.mean).abs() < 1e-12);
    assert!((before.ucb - after.ucb).abs() < 1e-12);
    assert_eq!(after.confidence, 0.75);
}

#[test]
fn conservative_preset_ramps_slower() {
    let demo = Config::default();
    let conservative = get_preset(PresetName::Conservative);
    let fast = wx_core::decision::stage_plan(1.5, &demo.staging);
    let slow = wx_core::decision::stage_plan(1.5, &conservative.staging);
    assert!(slow.steps[0] <= fast.steps[0]);
}
