//! Static region -> location table.
//!
//! Parsed once from the embedded `locations.toml` and never mutated.

use std::collections::HashSet;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

const LOCATIONS_TOML: &str = include_str!("locations.toml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Display name, also the key the datafeed uses.
    pub name: String,
    /// Point code, e.g. `SLAHH` for Henry Hub.
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub locations: Vec<Location>,
}

#[derive(Deserialize)]
struct LocationFile {
    #[serde(rename = "region")]
    regions: Vec<Region>,
}

static REGIONS: OnceLock<Vec<Region>> = OnceLock::new();

/// All regions in display order. The first region is the favourites list,
/// whose entries also appear under their geographic region.
pub fn regions() -> &'static [Region] {
    REGIONS.get_or_init(|| {
        toml::from_str::<LocationFile>(LOCATIONS_TOML)
            .unwrap_or_else(|e| panic!("Embedded locations.toml is malformed: {e}"))
            .regions
    })
}

pub fn region(name: &str) -> Option<&'static Region> {
    regions().iter().find(|r| r.name.eq_ignore_ascii_case(name))
}

/// Look a location up by display name or point code, ignoring case.
pub fn find(name_or_code: &str) -> Option<&'static Location> {
    let key = name_or_code.trim();
    regions()
        .iter()
        .flat_map(|r| r.locations.iter())
        .find(|l| l.name.eq_ignore_ascii_case(key) || l.code.eq_ignore_ascii_case(key))
}

/// Every location once, in table order.
pub fn all() -> Vec<&'static Location> {
    let mut seen = HashSet::new();
    regions()
        .iter()
        .flat_map(|r| r.locations.iter())
        .filter(|l| seen.insert(l.code.as_str()))
        .collect()
}
