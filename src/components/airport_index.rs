use crate::components::wrappers::{AirportCode, CountryCode};
use crate::{DataError, LoadJson};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// An entry of the global `airports.json`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AirportEntry {
    /// IATA code
    pub iata: AirportCode,
    /// ICAO code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icao: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Latitude in degrees, within [-90, 90]
    pub lat: f64,
    /// Longitude in degrees, within [-180, 180]
    pub lon: f64,
    /// Country the airport is in
    pub iso_country: CountryCode,
    /// City served
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl AirportEntry {
    /// Whether `lat` and `lon` are within their valid ranges.
    #[must_use]
    #[inline]
    pub fn has_valid_position(&self) -> bool {
        (-90.0_f64..=90.0_f64).contains(&self.lat) && (-180.0_f64..=180.0_f64).contains(&self.lon)
    }
}

/// The global airport metadata index.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AirportIndex {
    /// The airports by code
    pub airports: BTreeMap<AirportCode, AirportEntry>,
}

impl AirportIndex {
    /// Loads `airports.json`. A missing file yields an empty index.
    /// # Errors
    /// If the file exists but cannot be read or parsed.
    #[inline]
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        if !path.exists() {
            warn!("{} not found, continuing without airport metadata", path.display());
            return Ok(Self::default());
        }
        Self::load_json(path)
    }

    /// The entry for `code`, if any.
    #[must_use]
    #[inline]
    pub fn get(&self, code: &AirportCode) -> Option<&AirportEntry> {
        self.airports.get(code)
    }

    /// Whether the index knows `code`.
    #[must_use]
    #[inline]
    pub fn contains(&self, code: &AirportCode) -> bool {
        self.airports.contains_key(code)
    }

    /// The country of `code`, if known.
    #[must_use]
    #[inline]
    pub fn country(&self, code: &AirportCode) -> Option<&CountryCode> {
        self.airports.get(code).map(|a| &a.iso_country)
    }
}

#[allow(clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_reads_the_airport_index() {
        let index = AirportIndex::from_file(Path::new("./test/airports.json"))
            .expect("Failed to read airports.json");
        assert_eq!(index.airports.len(), 5);
        assert_eq!(
            index.country(&AirportCode::from("SIN")),
            Some(&CountryCode::from("SG"))
        );
        assert!(index.airports.values().all(AirportEntry::has_valid_position));
    }

    #[test]
    fn it_defaults_to_an_empty_index() {
        let index = AirportIndex::from_file(Path::new("./test/missing.json"))
            .expect("A missing index is not an error");
        assert!(index.airports.is_empty());
    }

    #[test]
    fn it_flags_positions_out_of_range() {
        let entry: AirportEntry = serde_json::from_str(
            r#"{"iata": "BAD", "name": "Bad", "lat": 91.0, "lon": 0.0, "iso_country": "JP"}"#,
        )
        .expect("Failed to parse entry");
        assert!(!entry.has_valid_position());
    }
}
