//! Synthetic daily forecasts.
//!
//! A forecast is a pure function of (point, start date, day count). Each
//! day draws from its own stream keyed by the base seed and the day
//! offset, so day `i` is identical whether 3 or 14 days are requested.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use tracing::debug;
use wx_common::{ClimateArchetype, Region};
use wx_math::{clamp, hash_str, SeededStream};

use crate::geo::GeoPoint;
use crate::meteorology::{dew_point_f, hdd, vpd_kpa};

/// Precipitation above which a day carries a precip type.
const PRECIP_TYPE_MIN_IN: f64 = 0.2;
/// Precipitation above which the condition is Rain/Snow.
const HEAVY_PRECIP_IN: f64 = 0.4;
const FREEZING_F: f64 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Snow,
    Rain,
    Cloudy,
    Windy,
    #[serde(rename = "Partly Cloudy")]
    PartlyCloudy,
    Clear,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Snow => "Snow",
            Condition::Rain => "Rain",
            Condition::Cloudy => "Cloudy",
            Condition::Windy => "Windy",
            Condition::PartlyCloudy => "Partly Cloudy",
            Condition::Clear => "Clear",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrecipType {
    Rain,
    Snow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temp_f: f64,
    pub rh_pct: f64,
    pub precip_in: f64,
    pub wind_mph: f64,
    pub gust_mph: f64,
    pub condition: Condition,
    pub precip_type: Option<PrecipType>,
    pub dew_point_f: f64,
    pub vpd_kpa: f64,
    pub hdd: f64,
    /// 0..1
    pub cloud_cover: f64,
    /// 0..11
    pub uv_index: f64,
    pub pressure_hpa: f64,
    pub visibility_mi: f64,
    /// Probability of precipitation, 0..1.
    pub pop: f64,
    pub sunrise: NaiveDateTime,
    pub sunset: NaiveDateTime,
}

/// Per-climate knobs applied on top of the seasonal baseline.
#[derive(Debug, Clone, Copy)]
struct ClimateBias {
    temp_amplitude: f64,
    rh: f64,
    precip: f64,
    wind: f64,
}

impl ClimateBias {
    fn for_point(point: &GeoPoint, start_ordinal: u32) -> Self {
        let temp_amplitude = match point.climate {
            ClimateArchetype::Desert => 24.0,
            ClimateArchetype::Mountain => 22.0,
            ClimateArchetype::Mediterranean => 18.0,
            ClimateArchetype::MarineWest => 15.0,
            ClimateArchetype::HumidSubtropical => 20.0,
            ClimateArchetype::HumidContinental => 21.0,
        };
        let rh = match point.climate {
            ClimateArchetype::Desert => -15.0,
            ClimateArchetype::HumidSubtropical => 15.0,
            ClimateArchetype::MarineWest => 8.0,
            _ => 0.0,
        };
        let precip = match point.climate {
            ClimateArchetype::Desert => -0.3,
            ClimateArchetype::HumidSubtropical => 0.2,
            ClimateArchetype::MarineWest => 0.15,
            // Wet winters, dry summers.
            ClimateArchetype::Mediterranean => {
                if !(90..=270).contains(&start_ordinal) {
                    0.2
                } else {
                    -0.2
                }
            }
            _ => 0.0,
        };
        let wind = if point.climate == ClimateArchetype::Mountain {
            5.0
        } else if point.region == Region::Midwest {
            3.0
        } else {
            0.0
        };
        Self {
            temp_amplitude,
            rh,
            precip,
            wind,
        }
    }
}

fn base_seed(point: &GeoPoint, start: NaiveDate) -> u32 {
    hash_str(&format!(
        "{:.2}:{:.2}:{}:{}:{}:{}",
        point.lat, point.lng, start, point.region, point.climate, point.coastal
    ))
}

/// Fractional hour → wall-clock time on `date`, truncated to the minute.
fn at_hour(date: NaiveDate, hour: f64) -> NaiveDateTime {
    let h = hour.floor();
    let m = ((hour - h) * 60.0).floor();
    let time = NaiveTime::from_hms_opt(h as u32, m as u32, 0).unwrap_or(NaiveTime::MIN);
    date.and_time(time)
}

fn simulate_day(
    point: &GeoPoint,
    bias: ClimateBias,
    seed: u32,
    start_ordinal: u32,
    date: NaiveDate,
    offset: u32,
) -> DailyForecast {
    let mut rnd = SeededStream::from_key(&format!("{seed}-{offset}"));
    let doy = f64::from(start_ordinal + offset);

    let phase = (2.0 * PI * doy / 365.0).sin();
    let lat_adj = (50.0 - clamp(point.lat.abs(), 20.0, 50.0)) * 0.2;
    let t_base = 60.0 + phase * bias.temp_amplitude - lat_adj;

    // Draw order is part of the output contract.
    let temp_f = t_base + rnd.jitter(8.0);
    let rh_pct = clamp(55.0 + bias.rh + rnd.jitter(25.0) - phase * 8.0, 15.0, 98.0);
    let precip_in = if rnd.exceeds(0.75 - bias.precip) {
        rnd.next_f64() * 0.9
    } else {
        0.0
    };
    let wind_mph = (5.0 + bias.wind + rnd.jitter(10.0)).max(0.0);
    let cloud_cover = clamp(0.5 + rnd.jitter(0.8), 0.0, 1.0);
    let uv_index = clamp(7.0 + phase * 3.0 + rnd.jitter(2.0), 0.0, 11.0);
    let pressure_hpa = 1013.0 + rnd.jitter(20.0);
    let visibility_mi = (10.0 + rnd.jitter(4.0) - precip_in * 6.0).max(1.0);
    let gust_mph = wind_mph + rnd.jitter(8.0).abs();
    let pop_base = if precip_in > 0.0 { 0.6 } else { 0.2 };
    let pop = clamp(pop_base + rnd.jitter(0.2), 0.0, 1.0);

    let precip_type = (precip_in > PRECIP_TYPE_MIN_IN).then(|| {
        if temp_f < FREEZING_F {
            PrecipType::Snow
        } else {
            PrecipType::Rain
        }
    });

    let condition = if precip_in > HEAVY_PRECIP_IN && temp_f < FREEZING_F {
        Condition::Snow
    } else if precip_in > HEAVY_PRECIP_IN {
        Condition::Rain
    } else if cloud_cover > 0.7 {
        Condition::Cloudy
    } else if wind_mph > 22.0 {
        Condition::Windy
    } else if rnd.exceeds(0.5) {
        Condition::PartlyCloudy
    } else {
        Condition::Clear
    };

    let day_len = 12.0
        + 4.0 * (2.0 * PI * (doy - 80.0) / 365.0).sin() * (point.lat.abs() * PI / 180.0).cos();
    let sunrise = at_hour(date, (12.0 - day_len / 2.0).max(5.0));
    let sunset = at_hour(date, (12.0 + day_len / 2.0).min(21.0));

    DailyForecast {
        date,
        temp_f,
        rh_pct,
        precip_in,
        wind_mph,
        gust_mph,
        condition,
        precip_type,
        dew_point_f: dew_point_f(temp_f, rh_pct),
        vpd_kpa: vpd_kpa(temp_f, rh_pct),
        hdd: hdd(temp_f),
        cloud_cover,
        uv_index,
        pressure_hpa,
        visibility_mi,
        pop,
        sunrise,
        sunset,
    }
}

/// Generate `days` consecutive daily forecasts starting at `start`.
pub fn generate_forecast(point: &GeoPoint, start: NaiveDate, days: usize) -> Vec<DailyForecast> {
    let seed = base_seed(point, start);
    let start_ordinal = start.ordinal();
    let bias = ClimateBias::for_point(point, start_ordinal);
    debug!(lat = point.lat, lng = point.lng, %start, days, seed, "generating forecast");

    (0..u32::try_from(days).unwrap_or(u32::MAX))
        .map_while(|i| {
            let date = start.checked_add_days(Days::new(u64::from(i)))?;
            Some(simulate_day(point, bias, seed, start_ordinal, date, i))
        })
        .collect()
}

/// Max minus min temperature over the first `n` days.
pub fn temp_range_f(days: &[DailyForecast], n: usize) -> f64 {
    let window = &days[..n.min(days.len())];
    let hi = window.iter().map(|d| d.temp_f).fold(f64::NEG_INFINITY, f64::max);
    let lo = window.iter().map(|d| d.temp_f).fold(f64::INFINITY, f64::min);
    if window.is_empty() {
        0.0
    } else {
        hi - lo
    }
}
