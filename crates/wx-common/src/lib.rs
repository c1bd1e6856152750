//! Weather intelligence common types, IDs, and errors.
//!
//! This crate provides foundational types shared across wx-core modules:
//! - The fixed 21-dimension feature contract shared by the feature builder,
//!   the network priors, and the online learner
//! - Climate and region vocabularies
//! - Cohort and brand identity types
//! - Explicit fallback tagging for degraded inputs
//! - Common error types

pub mod climate;
pub mod derived;
pub mod error;
pub mod feature;
pub mod id;
pub mod schema;

pub use climate::{ClimateArchetype, ClimateZone, Region};
pub use derived::{Derived, FallbackReason};
pub use error::{Error, Result};
pub use feature::{Feature, FEATURE_DIM, FEATURE_NAMES};
pub use id::{BrandKey, CohortKey, GeoCohort};
pub use schema::SCHEMA_VERSION;
