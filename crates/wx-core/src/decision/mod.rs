//! Decision utilities (online learner, budget staging, safety gate).

pub mod online;
pub mod safety;
pub mod staging;

pub use online::{OnlineError, OnlineState, UcbScore, MIN_VARIANCE};
pub use safety::{compute_safety, SafetyReason, SafetyState, SafetyStatus};
pub use staging::{stage_plan, StagedPlan};
