//! Brand, geography, and cohort identity types.
//!
//! A learned model instance is scoped by (brand, category, geo cohort).
//! The cohort key string is the registry key and also the seed material for
//! cosmetic jitter, so its format is stable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geo cohort used when the caller does not narrow the geography.
pub const DEFAULT_GEO: &str = "default";

/// Brand catalog key (e.g. `canopy`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandKey(pub String);

impl BrandKey {
    pub fn new(key: impl Into<String>) -> Self {
        BrandKey(key.into().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BrandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BrandKey {
    fn from(s: &str) -> Self {
        BrandKey::new(s)
    }
}

/// Geographic granularity of a cohort.
///
/// Format: `<state>|<metro or all>|<cell or all>`
/// Example: `NY|NY-M2|all`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoCohort(pub String);

impl GeoCohort {
    pub fn new(state: &str, metro: Option<&str>, cell: Option<&str>) -> Self {
        GeoCohort(format!(
            "{}|{}|{}",
            state,
            metro.unwrap_or("all"),
            cell.unwrap_or("all")
        ))
    }

    pub fn state(state: &str) -> Self {
        Self::new(state, None, None)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeoCohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry key for one online learner instance.
///
/// Format: `<brand>::<category>::<geo or "default">`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CohortKey(pub String);

impl CohortKey {
    pub fn new(brand: &BrandKey, category: &str, geo: Option<&GeoCohort>) -> Self {
        CohortKey(format!(
            "{}::{}::{}",
            brand,
            category,
            geo.map(GeoCohort::as_str).unwrap_or(DEFAULT_GEO)
        ))
    }

    /// Parse an existing key string. Requires exactly three `::` segments.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split("::").collect();
        if parts.len() == 3 && parts.iter().all(|p| !p.is_empty()) {
            Some(CohortKey(s.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CohortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
