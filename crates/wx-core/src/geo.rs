//! Procedural US geography.
//!
//! Three levels (state → metro → cell), each a pure function of its parent:
//! recomputing children from the same parent always yields the same ids,
//! names, coordinates, and tags. State centroids are region center plus
//! seeded jitter; nothing here is a real coordinate.

use serde::{Deserialize, Serialize};
use wx_common::{ClimateArchetype, Region};
use wx_math::{hash_str, SeededStream};

/// Bare coordinates, e.g. a brand's headquarters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A point the forecast simulator can run against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    pub region: Region,
    pub climate: ClimateArchetype,
    pub coastal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsState {
    pub code: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub region: Region,
    pub climate: ClimateArchetype,
    pub coastal: bool,
}

impl UsState {
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lng,
            region: self.region,
            climate: self.climate,
            coastal: self.coastal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoTag {
    Coastal,
    Mountain,
    Urban,
    Inland,
    Suburban,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metro {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub tags: Vec<GeoTag>,
}

impl Metro {
    /// Metro coordinates with the parent state's climate attributes.
    pub fn point(&self, state: &UsState) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lng,
            ..state.point()
        }
    }

    /// State code this metro belongs to (`NY` for `NY-M2`).
    pub fn state_code(&self) -> &str {
        self.id.split('-').next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub tags: Vec<GeoTag>,
}

impl Cell {
    pub fn point(&self, state: &UsState) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lng,
            ..state.point()
        }
    }
}

struct RegionSpec {
    region: Region,
    center: (f64, f64),
    spread: (f64, f64),
    states: &'static [&'static str],
}

static REGIONS: &[RegionSpec] = &[
    RegionSpec {
        region: Region::West,
        center: (39.0, -119.0),
        spread: (6.0, 8.0),
        states: &[
            "WA", "OR", "CA", "NV", "ID", "UT", "AZ", "NM", "CO", "MT", "WY", "AK", "HI",
        ],
    },
    RegionSpec {
        region: Region::Midwest,
        center: (41.0, -93.0),
        spread: (5.0, 6.0),
        states: &[
            "ND", "SD", "NE", "KS", "MN", "IA", "MO", "WI", "IL", "MI", "IN", "OH",
        ],
    },
    RegionSpec {
        region: Region::South,
        center: (33.0, -86.0),
        spread: (5.0, 7.0),
        states: &[
            "OK", "TX", "AR", "LA", "MS", "AL", "GA", "FL", "SC", "NC", "TN", "KY", "VA", "WV",
        ],
    },
    RegionSpec {
        region: Region::Northeast,
        center: (42.0, -73.0),
        spread: (3.0, 4.0),
        states: &[
            "PA", "NY", "NJ", "CT", "RI", "MA", "VT", "NH", "ME", "DC", "MD", "DE",
        ],
    },
];

static STATE_NAMES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DC", "District of Columbia"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("IA", "Iowa"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("MA", "Massachusetts"),
    ("MD", "Maryland"),
    ("ME", "Maine"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MO", "Missouri"),
    ("MS", "Mississippi"),
    ("MT", "Montana"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("NE", "Nebraska"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NV", "Nevada"),
    ("NY", "New York"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VA", "Virginia"),
    ("VT", "Vermont"),
    ("WA", "Washington"),
    ("WI", "Wisconsin"),
    ("WV", "West Virginia"),
    ("WY", "Wyoming"),
];

const DESERT_STATES: &[&str] = &["AZ", "NV", "NM"];
const MOUNTAIN_STATES: &[&str] = &["CO", "WY", "MT", "UT", "ID"];
const MEDITERRANEAN_STATES: &[&str] = &["CA", "OR"];
const COASTAL_STATES: &[&str] = &[
    "WA", "OR", "CA", "AK", "HI", "TX", "LA", "MS", "AL", "FL", "GA", "SC", "NC", "VA", "MD", "DE",
    "NJ", "NY", "CT", "RI", "MA", "NH", "ME",
];

const METRO_ADJECTIVES: &[&str] = &[
    "Central", "North", "South", "East", "West", "Heights", "Valley", "Coastal", "Inland",
];
const METRO_NOUNS: &[&str] = &["Metro", "Hub", "Corridor", "Basin", "Plain", "Ridge"];

fn state_name(code: &str) -> String {
    STATE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, n)| n.to_string())
        .unwrap_or_else(|| code.to_string())
}

fn derive_climate(code: &str, region: Region) -> ClimateArchetype {
    if DESERT_STATES.contains(&code) {
        return ClimateArchetype::Desert;
    }
    if MOUNTAIN_STATES.contains(&code) {
        return ClimateArchetype::Mountain;
    }
    if MEDITERRANEAN_STATES.contains(&code) {
        return ClimateArchetype::Mediterranean;
    }
    match region {
        Region::West => ClimateArchetype::MarineWest,
        Region::South => ClimateArchetype::HumidSubtropical,
        Region::Northeast | Region::Midwest => ClimateArchetype::HumidContinental,
    }
}

/// All states (plus DC) with derived centroids.
pub fn derive_states() -> Vec<UsState> {
    let mut all = Vec::with_capacity(51);
    for spec in REGIONS {
        for &code in spec.states {
            let mut rnd = SeededStream::from_key(&format!("{}-{}", spec.region, code));
            let lat = spec.center.0 + rnd.jitter(spec.spread.0);
            let lng = spec.center.1 + rnd.jitter(spec.spread.1);
            all.push(UsState {
                code: code.to_string(),
                name: state_name(code),
                lat,
                lng,
                region: spec.region,
                climate: derive_climate(code, spec.region),
                coastal: COASTAL_STATES.contains(&code),
            });
        }
    }
    all
}

/// Look up a derived state by (case-insensitive) code.
pub fn find_state(code: &str) -> Option<UsState> {
    derive_states()
        .into_iter()
        .find(|s| s.code.eq_ignore_ascii_case(code))
}

/// Three to six metros around the state centroid.
pub fn metros_for_state(state: &UsState) -> Vec<Metro> {
    let count = (state.name.len() % 6 + 3).clamp(3, 6);
    let base_seed = hash_str(&format!("metro:{}:{}:{}", state.code, state.lat, state.lng));
    let prefix = state.name.split(' ').next().unwrap_or(&state.name);

    (0..count)
        .map(|i| {
            let mut rnd = SeededStream::new(base_seed.wrapping_add(i as u32));
            let lat = state.lat + rnd.jitter(1.8);
            let lng = state.lng + rnd.jitter(2.4);
            let adjective = rnd.pick(METRO_ADJECTIVES).copied().unwrap_or("Central");
            let noun = rnd.pick(METRO_NOUNS).copied().unwrap_or("Metro");

            let mut tags = Vec::new();
            if state.coastal && rnd.exceeds(0.4) {
                tags.push(GeoTag::Coastal);
            }
            if state.climate == ClimateArchetype::Mountain && rnd.exceeds(0.4) {
                tags.push(GeoTag::Mountain);
            }
            if rnd.exceeds(0.6) {
                tags.push(GeoTag::Urban);
            }
            if rnd.exceeds(0.7) {
                tags.push(GeoTag::Inland);
            }

            Metro {
                id: format!("{}-M{}", state.code, i + 1),
                name: format!("{prefix} {adjective} {noun}"),
                lat,
                lng,
                tags,
            }
        })
        .collect()
}

/// Three to five cells around the metro centroid.
pub fn cells_for_metro(metro: &Metro) -> Vec<Cell> {
    let count = 3 + (hash_str(&metro.id) % 3) as usize;
    let base_seed = hash_str(&format!("cell:{}", metro.id));

    (0..count)
        .map(|i| {
            let mut rnd = SeededStream::new(base_seed.wrapping_add(i as u32));
            let lat = metro.lat + rnd.jitter(0.6);
            let lng = metro.lng + rnd.jitter(0.6);
            let tag = if rnd.exceeds(0.5) {
                GeoTag::Urban
            } else {
                GeoTag::Suburban
            };
            Cell {
                id: format!("{}-C{}", metro.id, i + 1),
                lat,
                lng,
                tags: vec![tag],
            }
        })
        .collect()
}

/// Resolve a metro id such as `NY-M2` back to its state and metro.
pub fn find_metro(metro_id: &str) -> Option<(UsState, Metro)> {
    let code = metro_id.split('-').next()?;
    let state = find_state(code)?;
    let metro = metros_for_state(&state)
        .into_iter()
        .find(|m| m.id.eq_ignore_ascii_case(metro_id))?;
    Some((state, metro))
}
