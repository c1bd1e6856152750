//! Weather intelligence core.
//!
//! Simulates geography and daily forecasts, turns an observation into a
//! fixed 21-feature vector, and scores brand categories with a ridge/LinUCB
//! learner blended against network priors. Budget changes are staged over
//! several days and gated by a forecast-volatility safety check.
//!
//! Every generator is seeded from its inputs, so identical requests produce
//! identical output.

pub mod audit;
pub mod brands;
pub mod cli;
pub mod decision;
pub mod exit_codes;
pub mod features;
pub mod forecast;
pub mod geo;
pub mod logging;
pub mod meteorology;
pub mod recommend;
pub mod regime;
pub mod scoring;

pub use brands::{find_brand, Brand};
pub use decision::{compute_safety, stage_plan, OnlineState, SafetyState, StagedPlan};
pub use exit_codes::ExitCode;
pub use features::{build_feature_vector, FeatureInput, FeatureVector, WeatherObservation};
pub use forecast::{generate_forecast, DailyForecast};
pub use recommend::{recommend, Recommendation, RecommendRequest};
pub use scoring::{CohortRegistry, PredictionResult, ScoreInput, ScoringEngine};
