//! Criterion benchmarks for the scoring hot path in `wx-core`.
//!
//! Covers feature building, the ridge/LinUCB learner at the 21-feature
//! dimension, full category scoring, and forecast simulation.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wx_common::{BrandKey, FEATURE_DIM};
use wx_config::Config;
use wx_core::decision::OnlineState;
use wx_core::features::{build_feature_vector, FeatureInput, WeatherObservation};
use wx_core::forecast::generate_forecast;
use wx_core::geo::{find_state, LatLng};
use wx_core::scoring::{ScoreInput, ScoringEngine};
use wx_math::SeededStream;

fn jan15() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

fn contexts(n: usize) -> Vec<Vec<f64>> {
    let mut rnd = SeededStream::new(7);
    (0..n)
        .map(|_| (0..FEATURE_DIM).map(|_| rnd.uniform(-1.0, 1.0)).collect())
        .collect()
}

fn bench_features(c: &mut Criterion) {
    let input = FeatureInput::new(WeatherObservation::new(38.0, 30.0, 0.0), jan15());
    let mut group = c.benchmark_group("features");
    group.bench_function("build", |b| {
        b.iter(|| black_box(build_feature_vector(black_box(&input)).vector.dryness))
    });
    group.finish();
}

fn bench_learner(c: &mut Criterion) {
    let mut group = c.benchmark_group("learner");

    for n in [10usize, 100, 1000] {
        let xs = contexts(n);
        group.bench_with_input(BenchmarkId::new("update", n), &xs, |b, xs| {
            b.iter(|| {
                let mut st = OnlineState::new(FEATURE_DIM, 5.0);
                for x in xs {
                    st.update(x, 0.5).unwrap();
                }
                black_box(st.updates());
            })
        });
    }

    let mut st = OnlineState::new(FEATURE_DIM, 5.0);
    for x in contexts(100) {
        st.update(&x, 0.5).unwrap();
    }
    let query = contexts(1).remove(0);
    group.bench_function("ucb_score", |b| {
        b.iter(|| black_box(st.ucb_score(black_box(&query), 1.0).unwrap().ucb))
    });
    group.finish();
}

fn bench_score_category(c: &mut Criterion) {
    let config = Config::default();
    let mut engine = ScoringEngine::new(&config);
    let input = ScoreInput::new(
        BrandKey::new("canopy"),
        LatLng::new(40.7128, -74.0060),
        "winter",
        WeatherObservation::new(38.0, 30.0, 0.0),
        jan15(),
    );
    engine.update_category(&input, Some(0.8)).unwrap();

    let mut group = c.benchmark_group("scoring");
    group.bench_function("score_category", |b| {
        b.iter(|| black_box(engine.score_category(black_box(&input)).unwrap().mean))
    });
    group.finish();
}

fn bench_forecast(c: &mut Criterion) {
    let point = find_state("NY").unwrap().point();
    let mut group = c.benchmark_group("forecast");
    for days in [7usize, 30] {
        group.bench_with_input(BenchmarkId::new("generate", days), &days, |b, &days| {
            b.iter(|| black_box(generate_forecast(&point, jan15(), days).len()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_features,
    bench_learner,
    bench_score_category,
    bench_forecast
);
criterion_main!(benches);
