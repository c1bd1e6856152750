//! Meteorology helpers.
//!
//! Pure conversions over temperature (°F) and relative humidity (%):
//! dew point (Magnus), vapor-pressure deficit (Tetens), degree days against
//! a 65°F base, anomalies against fixed monthly climatology, and a
//! composite dryness index in [0, 1].

use wx_common::ClimateZone;
use wx_math::{clamp, clamp01};

/// Base temperature for heating/cooling degree days.
pub const DEGREE_DAY_BASE_F: f64 = 65.0;

/// VPD at which the dryness component saturates.
const VPD_CAP_KPA: f64 = 2.5;

/// Monthly climatology (Jan..Dec).
const MONTHLY_RH_BASELINE: [f64; 12] = [
    65.0, 62.0, 60.0, 58.0, 60.0, 64.0, 66.0, 67.0, 66.0, 64.0, 66.0, 66.0,
];
const MONTHLY_DP_BASELINE_F: [f64; 12] = [
    35.0, 36.0, 38.0, 43.0, 51.0, 58.0, 62.0, 60.0, 55.0, 48.0, 41.0, 37.0,
];

pub fn f_to_c(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

pub fn c_to_f(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// Dew point (°F) by the Magnus approximation. RH is clamped into (0, 100].
pub fn dew_point_f(temp_f: f64, rh_pct: f64) -> f64 {
    const A: f64 = 17.27;
    const B: f64 = 237.7;
    let t_c = f_to_c(temp_f);
    let rh = clamp(rh_pct, 1e-6, 100.0);
    let alpha = (A * t_c) / (B + t_c) + (rh / 100.0).ln();
    c_to_f((B * alpha) / (A - alpha))
}

/// Saturation vapor pressure (kPa) by Tetens.
pub fn saturation_vapor_pressure_kpa(temp_f: f64) -> f64 {
    let t_c = f_to_c(temp_f);
    0.6108 * ((17.27 * t_c) / (t_c + 237.3)).exp()
}

/// Vapor-pressure deficit (kPa), floored at 0.
pub fn vpd_kpa(temp_f: f64, rh_pct: f64) -> f64 {
    let es = saturation_vapor_pressure_kpa(temp_f);
    let ea = (rh_pct / 100.0) * es;
    (es - ea).max(0.0)
}

pub fn hdd(temp_f: f64) -> f64 {
    (DEGREE_DAY_BASE_F - temp_f).max(0.0)
}

pub fn cdd(temp_f: f64) -> f64 {
    (temp_f - DEGREE_DAY_BASE_F).max(0.0)
}

/// RH minus the monthly baseline. `month0` is 0-based.
pub fn rh_anomaly(rh_pct: f64, month0: usize) -> f64 {
    rh_pct - MONTHLY_RH_BASELINE[month0 % 12]
}

/// Dew point minus the monthly baseline. `month0` is 0-based.
pub fn dew_point_anomaly_f(dp_f: f64, month0: usize) -> f64 {
    dp_f - MONTHLY_DP_BASELINE_F[month0 % 12]
}

/// Composite dryness in [0, 1]: 0.5 normalized VPD, 0.3 inverted RH
/// anomaly, 0.2 inverted dew-point anomaly.
pub fn dryness_index(temp_f: f64, rh_pct: f64, month0: usize) -> f64 {
    let dp = dew_point_f(temp_f, rh_pct);
    let v = vpd_kpa(temp_f, rh_pct);
    let rha = -rh_anomaly(rh_pct, month0);
    let dpa = -dew_point_anomaly_f(dp, month0);

    let v_n = (v / VPD_CAP_KPA).min(1.0);
    let r_n = clamp01((rha + 20.0) / 40.0);
    let d_n = clamp01((dpa + 20.0) / 40.0);
    clamp01(0.5 * v_n + 0.3 * r_n + 0.2 * d_n)
}

/// Rough Köppen-like zone from a coordinate.
pub fn climate_zone_for_lat_lng(lat: f64, lng: f64) -> ClimateZone {
    if !(-20.0..=20.0).contains(&lat) {
        if lat > 40.0 {
            return ClimateZone::HumidContinental;
        }
        if lat > 30.0 {
            return ClimateZone::HumidSubtropical;
        }
        return ClimateZone::MarineWestCoast;
    }
    if lng.abs() > 110.0 {
        ClimateZone::SemiArid
    } else {
        ClimateZone::Tropical
    }
}
