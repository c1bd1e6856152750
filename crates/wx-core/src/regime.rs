//! Weather regime detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use wx_math::SeededStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    DryCold,
    Heat,
    Storm,
    Normal,
}

impl Regime {
    pub fn as_str(self) -> &'static str {
        match self {
            Regime::DryCold => "dry_cold",
            Regime::Heat => "heat",
            Regime::Storm => "storm",
            Regime::Normal => "normal",
        }
    }

    /// One-hot in the order dry_cold, heat, storm, normal.
    pub fn embedding(self) -> [f64; 4] {
        let mut e = [0.0; 4];
        let i = match self {
            Regime::DryCold => 0,
            Regime::Heat => 1,
            Regime::Storm => 2,
            Regime::Normal => 3,
        };
        e[i] = 1.0;
        e
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storm beats dry-cold beats heat.
pub fn detect_regime(temp_f: f64, rh_pct: f64, precip_in: f64) -> Regime {
    if precip_in > 0.3 {
        Regime::Storm
    } else if temp_f <= 45.0 && rh_pct < 40.0 {
        Regime::DryCold
    } else if temp_f >= 85.0 {
        Regime::Heat
    } else {
        Regime::Normal
    }
}

/// Plausible count of historical analog events for a regime.
pub fn similar_event_count(regime: Regime, climate: &str, rnd: &mut SeededStream) -> u32 {
    match regime {
        Regime::DryCold if climate.contains("humid") => rnd.below(24, 12),
        Regime::Heat => rnd.below(18, 10),
        Regime::Storm => rnd.below(12, 8),
        _ => rnd.below(8, 6),
    }
}
