//! Climate and region vocabularies.
//!
//! Two classifications coexist: `ClimateArchetype` is attached to derived
//! geography and drives the forecast simulator, while `ClimateZone` is a
//! rough Köppen-like zone inferred from a coordinate and drives the prior
//! lookup. Both serialize to snake_case names, which is what the priors
//! configuration matches against.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Climate archetype of a derived geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClimateArchetype {
    MarineWest,
    Mediterranean,
    Desert,
    HumidSubtropical,
    HumidContinental,
    Mountain,
}

impl ClimateArchetype {
    pub fn as_str(self) -> &'static str {
        match self {
            ClimateArchetype::MarineWest => "marine_west",
            ClimateArchetype::Mediterranean => "mediterranean",
            ClimateArchetype::Desert => "desert",
            ClimateArchetype::HumidSubtropical => "humid_subtropical",
            ClimateArchetype::HumidContinental => "humid_continental",
            ClimateArchetype::Mountain => "mountain",
        }
    }
}

impl fmt::Display for ClimateArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse climate zone inferred from latitude/longitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClimateZone {
    HumidContinental,
    HumidSubtropical,
    MarineWestCoast,
    SemiArid,
    Tropical,
    Arid,
}

impl ClimateZone {
    pub fn as_str(self) -> &'static str {
        match self {
            ClimateZone::HumidContinental => "humid_continental",
            ClimateZone::HumidSubtropical => "humid_subtropical",
            ClimateZone::MarineWestCoast => "marine_west_coast",
            ClimateZone::SemiArid => "semi_arid",
            ClimateZone::Tropical => "tropical",
            ClimateZone::Arid => "arid",
        }
    }
}

impl fmt::Display for ClimateZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// US macro-region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    West,
    Midwest,
    South,
    Northeast,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::West,
        Region::Midwest,
        Region::South,
        Region::Northeast,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::West => "WEST",
            Region::Midwest => "MIDWEST",
            Region::South => "SOUTH",
            Region::Northeast => "NORTHEAST",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
