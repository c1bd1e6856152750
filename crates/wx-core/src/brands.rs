//! Built-in brand catalog.

use serde::Serialize;
use wx_common::{BrandKey, Error, Result};

use crate::geo::LatLng;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryProducts {
    /// Category key, also the scoring category (`winter`, `rain`, ...).
    pub key: &'static str,
    pub products: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct Brand {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub city: &'static str,
    pub location: LatLng,
    pub categories: &'static [CategoryProducts],
}

impl Brand {
    pub fn brand_key(&self) -> BrandKey {
        BrandKey::new(self.key)
    }

    pub fn category(&self, key: &str) -> Option<&CategoryProducts> {
        self.categories
            .iter()
            .find(|c| c.key.eq_ignore_ascii_case(key))
    }

    pub fn category_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.categories.iter().map(|c| c.key)
    }
}

static BRANDS: &[Brand] = &[
    Brand {
        key: "norsari",
        name: "NorSari",
        description: "Wearable blankets & wool-blend wraps",
        city: "Northfield, MN",
        location: LatLng::new(44.4583, -93.1616),
        categories: &[
            CategoryProducts {
                key: "winter",
                products: &["Wool Wraps", "Weatherproof Wraps", "Heavyweight Wraps"],
            },
            CategoryProducts {
                key: "outdoor",
                products: &["Travel Wraps", "Lightweight Wraps"],
            },
            CategoryProducts {
                key: "rain",
                products: &["Weatherproof Wraps"],
            },
        ],
    },
    Brand {
        key: "patagonia",
        name: "Patagonia",
        description: "Outdoor clothing & gear",
        city: "Ventura, CA",
        location: LatLng::new(34.275, -119.231),
        categories: &[
            CategoryProducts {
                key: "winter",
                products: &["Insulated Jackets", "Down Sweaters", "Thermal Layers"],
            },
            CategoryProducts {
                key: "summer",
                products: &["Trail Shirts", "Shorts", "Capilene®"],
            },
            CategoryProducts {
                key: "outdoor",
                products: &["Fleece Jackets", "Vests", "Hiking Packs"],
            },
            CategoryProducts {
                key: "rain",
                products: &["Rain Jackets", "Storm Shells"],
            },
        ],
    },
    Brand {
        key: "kingsford",
        name: "Kingsford",
        description: "Charcoal & grilling supplies",
        city: "Louisville, KY",
        location: LatLng::new(38.2527, -85.7585),
        categories: &[
            CategoryProducts {
                key: "summer",
                products: &["Charcoal Briquets", "Hardwood Pellets", "Flavor Boosters"],
            },
            CategoryProducts {
                key: "outdoor",
                products: &["Lighter Fluid", "Chimney Starters", "Grill Accessories"],
            },
        ],
    },
    Brand {
        key: "canopy",
        name: "Canopy",
        description: "Smart humidifiers & air quality products",
        city: "New York, NY",
        location: LatLng::new(40.7128, -74.0060),
        categories: &[
            CategoryProducts {
                key: "winter",
                products: &[
                    "Large Room Humidifier",
                    "Bedroom Humidifier",
                    "Essential Oil Diffusers",
                ],
            },
            CategoryProducts {
                key: "summer",
                products: &["Cooling Mist Humidifier", "Portable Humidifier"],
            },
            CategoryProducts {
                key: "indoor",
                products: &["Smart Air Purifier", "Aroma Diffuser", "Replacement Filters"],
            },
            CategoryProducts {
                key: "wellness",
                products: &[
                    "Sleep Enhancement Bundle",
                    "Aromatherapy Collection",
                    "Hydration Monitoring",
                ],
            },
        ],
    },
];

pub fn all_brands() -> &'static [Brand] {
    BRANDS
}

/// Look up a brand by key or display name, case-insensitively.
pub fn find_brand(key: &str) -> Result<&'static Brand> {
    BRANDS
        .iter()
        .find(|b| b.key.eq_ignore_ascii_case(key) || b.name.eq_ignore_ascii_case(key))
        .ok_or_else(|| Error::UnknownBrand(key.to_string()))
}
