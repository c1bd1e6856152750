//! The fixed feature contract.
//!
//! The feature builder, the network priors, and the online learner all index
//! coefficient vectors positionally. `Feature::ALL` is the one canonical
//! ordering; reordering it invalidates every learned state and prior.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of feature dimensions.
pub const FEATURE_DIM: usize = 21;

/// Display labels in canonical order. Explainability panels index into this.
pub const FEATURE_NAMES: [&str; FEATURE_DIM] = [
    "TempF",
    "RH%",
    "PrecipIn",
    "DewPointF",
    "VPD(kPa)",
    "HDD",
    "RH_Anom",
    "DP_AnomF",
    "Dryness01",
    "DrynessTrend",
    "Weekend",
    "PromoActive",
    "PromoStrength",
    "CampaignActive",
    "CampaignStrength",
    "SpendToday",
    "Spend7d",
    "VPDxHDD",
    "WeekendxPromo",
    "DrynessMomentum7d",
    "ComfortShock7d",
];

/// One named feature dimension.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    TempF,
    RhPct,
    PrecipIn,
    DewPointF,
    VpdKpa,
    Hdd,
    RhAnom,
    DpAnomF,
    Dryness,
    DrynessTrend,
    Weekend,
    PromoActive,
    PromoStrength,
    CampaignActive,
    CampaignStrength,
    SpendToday,
    Spend7d,
    VpdTimesHdd,
    WeekendTimesPromo,
    DrynessMomentum7d,
    ComfortShock7d,
}

impl Feature {
    /// All features in canonical vector order.
    pub const ALL: [Feature; FEATURE_DIM] = [
        Feature::TempF,
        Feature::RhPct,
        Feature::PrecipIn,
        Feature::DewPointF,
        Feature::VpdKpa,
        Feature::Hdd,
        Feature::RhAnom,
        Feature::DpAnomF,
        Feature::Dryness,
        Feature::DrynessTrend,
        Feature::Weekend,
        Feature::PromoActive,
        Feature::PromoStrength,
        Feature::CampaignActive,
        Feature::CampaignStrength,
        Feature::SpendToday,
        Feature::Spend7d,
        Feature::VpdTimesHdd,
        Feature::WeekendTimesPromo,
        Feature::DrynessMomentum7d,
        Feature::ComfortShock7d,
    ];

    /// Position of this feature in the canonical vector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display label (matches `FEATURE_NAMES[self.index()]`).
    pub fn label(self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }

    /// Look up a feature by display label or snake_case id.
    pub fn parse(s: &str) -> Option<Self> {
        Feature::ALL.iter().copied().find(|f| {
            f.label() == s
                || serde_json::to_value(f)
                    .ok()
                    .and_then(|v| v.as_str().map(|id| id == s))
                    .unwrap_or(false)
        })
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
