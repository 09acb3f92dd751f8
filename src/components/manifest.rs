use crate::components::wrappers::{AirportCode, CarrierCode};
use crate::{DataError, LoadJson};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The manifest format this build reads.
pub const MANIFEST_VERSION: u32 = 1;

/// How far along an airline or airport is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Shards exist and are maintained
    Implemented,
    /// Intended to be tracked later
    Planned,
    /// Known but deliberately not tracked
    NotPlanned,
}

/// A known airline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AirlineInfo {
    /// IATA designator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iata: Option<String>,
    /// ICAO designator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icao: Option<String>,
    /// Local name
    pub name: String,
    /// English name
    #[serde(rename = "nameEn", default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    /// Implementation status
    pub status: Status,
    /// Major, LCC, regional or commuter
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Home airport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<AirportCode>,
}

/// A known airport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AirportInfo {
    /// IATA code
    #[serde(default)]
    pub iata: AirportCode,
    /// ICAO code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icao: Option<String>,
    /// Local name
    pub name: String,
    /// English name
    #[serde(rename = "nameEn", default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    /// Implementation status
    pub status: Status,
    /// Region of the country, or `international`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Major, regional or local
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// The hand-maintained declaration of which airlines and airports should be tracked.
///
/// This is the ground truth for "what should exist"; the shard store is the ground truth for
/// "what does exist".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CoverageManifest {
    /// Format version, see [`MANIFEST_VERSION`]
    pub version: u32,
    /// All known airlines
    #[serde(default)]
    pub airlines: BTreeMap<CarrierCode, AirlineInfo>,
    /// All known airports
    #[serde(default)]
    pub airports: BTreeMap<AirportCode, AirportInfo>,
}

impl Default for CoverageManifest {
    #[inline]
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION,
            airlines: BTreeMap::new(),
            airports: BTreeMap::new(),
        }
    }
}

impl CoverageManifest {
    /// Loads and version-checks the manifest.
    /// # Errors
    /// * If the file does not exist or is not a valid manifest
    /// * If the manifest version is not supported
    #[inline]
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        if !path.exists() {
            return Err(DataError::FileNotFoundError(path.to_path_buf()));
        }
        let manifest = Self::load_json(path)?;
        if manifest.version != MANIFEST_VERSION {
            return Err(DataError::UnsupportedManifestVersion(manifest.version));
        }
        Ok(manifest)
    }

    /// The status of an airport, if the manifest knows it.
    #[must_use]
    #[inline]
    pub fn airport_status(&self, code: &AirportCode) -> Option<Status> {
        self.airports.get(code).map(|a| a.status)
    }

    /// Airports marked implemented, in code order.
    #[inline]
    pub fn implemented_airports(&self) -> impl Iterator<Item = &AirportCode> {
        self.airports
            .iter()
            .filter(|(_, info)| info.status == Status::Implemented)
            .map(|(code, _)| code)
    }
}

#[allow(clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn it_reads_the_coverage_manifest() {
        let manifest = CoverageManifest::from_file(Path::new("./test/coverage.json"))
            .expect("Failed to read coverage.json");
        assert_eq!(manifest.airlines.len(), 4);
        assert_eq!(manifest.airports.len(), 5);
        assert_eq!(
            manifest.airport_status(&AirportCode::from("KMQ")),
            Some(Status::Planned)
        );
        assert_eq!(
            manifest.airlines[&CarrierCode::from("IJ")].status,
            Status::NotPlanned
        );
        assert_eq!(manifest.implemented_airports().count(), 4);
    }

    #[test]
    fn it_rejects_unknown_versions() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("coverage.json");
        fs::write(&path, r#"{"version": 2, "airlines": {}, "airports": {}}"#)
            .expect("Failed to write manifest");
        let err = CoverageManifest::from_file(&path).expect_err("version 2 must be rejected");
        assert!(matches!(err, DataError::UnsupportedManifestVersion(2)));
    }

    #[test]
    fn it_requires_the_manifest_to_exist() {
        let err = CoverageManifest::from_file(Path::new("./test/missing.json"))
            .expect_err("missing manifest must fail");
        assert!(matches!(err, DataError::FileNotFoundError(_)));
    }
}
