use crate::components::wrappers::CarrierCode;
use crate::{DataError, LoadJson};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// An entry of the global `airlines.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AirlineEntry {
    /// IATA designator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iata: Option<String>,
    /// ICAO designator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icao: Option<String>,
    /// Display name
    pub name: String,
}

/// The global airline metadata index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AirlineIndex {
    /// The airlines by carrier code
    pub airlines: BTreeMap<CarrierCode, AirlineEntry>,
}

impl AirlineIndex {
    /// Loads `airlines.json`. A missing file yields an empty index.
    /// # Errors
    /// If the file exists but cannot be read or parsed.
    #[inline]
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        if !path.exists() {
            warn!("{} not found, continuing without airline metadata", path.display());
            return Ok(Self::default());
        }
        Self::load_json(path)
    }

    /// Whether the index knows `code`.
    #[must_use]
    #[inline]
    pub fn contains(&self, code: &CarrierCode) -> bool {
        self.airlines.contains_key(code)
    }
}

#[allow(clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_reads_the_airline_index() {
        let index = AirlineIndex::from_file(Path::new("./test/airlines.json"))
            .expect("Failed to read airlines.json");
        assert_eq!(index.airlines.len(), 2);
        assert!(index.contains(&CarrierCode::from("JL")));
        assert!(!index.contains(&CarrierCode::from("jl")));
    }
}
