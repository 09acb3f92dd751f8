use crate::components::prelude::*;
use serde::Serialize;

/// Coverage figures for one manifest category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[non_exhaustive]
pub struct CategoryCoverage {
    /// Entries marked implemented
    pub implemented: usize,
    /// All entries
    pub total: usize,
    /// `implemented / total` as a rounded percentage, 0 for an empty category
    pub coverage: u32,
    /// Entries marked planned
    pub planned: usize,
}

impl CategoryCoverage {
    /// Tallies a set of statuses.
    #[must_use]
    #[inline]
    pub fn from_statuses<I: IntoIterator<Item = Status>>(statuses: I) -> Self {
        let mut tally = Self::default();
        for status in statuses {
            tally.total += 1;
            match status {
                Status::Implemented => tally.implemented += 1,
                Status::Planned => tally.planned += 1,
                Status::NotPlanned => {}
            }
        }
        tally.coverage = percentage(tally.implemented, tally.total);
        tally
    }
}

/// Coverage of the manifest's airlines and airports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[non_exhaustive]
pub struct Coverage {
    /// Airline coverage
    pub airlines: CategoryCoverage,
    /// Airport coverage
    pub airports: CategoryCoverage,
}

/// Derives coverage percentages from the manifest's statuses.
#[must_use]
#[inline]
pub fn calculate_coverage(manifest: &CoverageManifest) -> Coverage {
    Coverage {
        airlines: CategoryCoverage::from_statuses(manifest.airlines.values().map(|a| a.status)),
        airports: CategoryCoverage::from_statuses(manifest.airports.values().map(|a| a.status)),
    }
}

/// `round(100 * part / whole)` with halves rounded up, and 0 when `whole` is 0.
#[allow(clippy::integer_arithmetic)]
#[allow(clippy::integer_division)]
fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let rounded = (200 * part + whole) / (2 * whole);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

#[allow(clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn airline(status: Status) -> AirlineInfo {
        AirlineInfo {
            iata: None,
            icao: None,
            name: "test".to_owned(),
            name_en: None,
            status,
            kind: None,
            base: None,
        }
    }

    #[test]
    fn it_computes_airline_coverage() {
        let mut manifest = CoverageManifest::default();
        for (code, status) in [
            ("NH", Status::Implemented),
            ("JL", Status::Implemented),
            ("9C", Status::Planned),
            ("IJ", Status::NotPlanned),
        ] {
            manifest.airlines.insert(CarrierCode::from(code), airline(status));
        }
        let coverage = calculate_coverage(&manifest);
        assert_eq!(
            coverage.airlines,
            CategoryCoverage {
                implemented: 2,
                total: 4,
                coverage: 50,
                planned: 1
            }
        );
    }

    #[test]
    fn it_returns_zero_for_an_empty_category() {
        let coverage = calculate_coverage(&CoverageManifest::default());
        assert_eq!(coverage.airlines.coverage, 0);
        assert_eq!(coverage.airports.coverage, 0);
        assert_eq!(coverage.airports.total, 0);
    }

    #[test]
    fn it_rounds_halves_up() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(7, 7), 100);
    }

    #[test]
    fn it_computes_coverage_of_the_fixture() {
        let manifest = CoverageManifest::from_file(Path::new("./test/coverage.json"))
            .expect("Failed to read coverage.json");
        let coverage = calculate_coverage(&manifest);
        assert_eq!(coverage.airports.implemented, 4);
        assert_eq!(coverage.airports.total, 5);
        assert_eq!(coverage.airports.coverage, 80);
        assert_eq!(coverage.airports.planned, 1);
        assert_eq!(coverage.airlines.coverage, 50);
    }
}
