//! The consistency checker.
//!
//! Runs a fixed battery of independent checks over the shard store and the global documents.
//! Every check always runs; malformed records become findings instead of failures. Findings
//! are ordered by check category, then by discovery order, and traversal is over ordered maps,
//! so the same inputs always give the same report.

use crate::components::prelude::*;
use crate::coverage::calculate_coverage;
use crate::graph::RouteGraph;
use derive_more::Display;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashSet};

/// How serious a finding is.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Counts and percentages
    #[display(fmt = "info")]
    Info,
    /// Staleness, orphaned data, soft metadata drift. Does not block.
    #[display(fmt = "warning")]
    Warning,
    /// Symmetry, attribution or coverage violations. Blocks.
    #[display(fmt = "error")]
    Error,
}

/// Which check produced a finding. Variants are in execution order.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Shards versus the manifest, and route shape
    #[display(fmt = "structure")]
    Structure,
    /// Every edge has its reverse edge
    #[display(fmt = "symmetry")]
    Symmetry,
    /// Every route cites its sources
    #[display(fmt = "attribution")]
    Attribution,
    /// The manifest matches what is on disk
    #[display(fmt = "coverage")]
    Coverage,
    /// Shards versus the airport and airline indexes
    #[display(fmt = "metadata")]
    Metadata,
}

/// A single result of a check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct Finding {
    /// Severity
    pub kind: Kind,
    /// The check that produced it
    pub category: Category,
    /// Human readable description
    pub message: String,
    /// Structured context, e.g. the carrier and endpoints of a route
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Counts of findings by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[non_exhaustive]
pub struct Summary {
    /// Info findings
    pub info: usize,
    /// Warning findings
    pub warning: usize,
    /// Error findings
    pub error: usize,
}

/// Everything the checker found, in category then discovery order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[non_exhaustive]
pub struct ValidationReport {
    /// The findings
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    /// The findings of one kind, in report order.
    #[inline]
    pub fn of_kind(&self, kind: Kind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    /// The number of findings of one kind.
    #[must_use]
    #[inline]
    pub fn count(&self, kind: Kind) -> usize {
        self.of_kind(kind).count()
    }

    /// Whether any finding is an error. Callers treat this as a hard failure.
    #[must_use]
    #[inline]
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.kind == Kind::Error)
    }

    /// Counts by kind.
    #[must_use]
    #[inline]
    pub fn summary(&self) -> Summary {
        Summary {
            info: self.count(Kind::Info),
            warning: self.count(Kind::Warning),
            error: self.count(Kind::Error),
        }
    }

    /// Findings grouped for triage: info, then warnings, then errors.
    #[must_use]
    #[inline]
    pub fn grouped(&self) -> [(Kind, Vec<&Finding>); 3] {
        [Kind::Info, Kind::Warning, Kind::Error].map(|kind| (kind, self.of_kind(kind).collect()))
    }
}

/// Runs every check. Pure: reads its inputs only and never fails.
#[must_use]
#[inline]
pub fn validate(
    store: &ShardStore,
    airports: &AirportIndex,
    airlines: &AirlineIndex,
    manifest: &CoverageManifest,
) -> ValidationReport {
    let mut checker = Checker {
        store,
        airports,
        airlines,
        manifest,
        findings: Vec::new(),
    };
    checker.check_structure();
    checker.check_symmetry();
    checker.check_attribution();
    checker.check_coverage();
    checker.check_metadata();
    ValidationReport {
        findings: checker.findings,
    }
}

struct Checker<'a> {
    store: &'a ShardStore,
    airports: &'a AirportIndex,
    airlines: &'a AirlineIndex,
    manifest: &'a CoverageManifest,
    findings: Vec<Finding>,
}

fn route_details(carrier: &CarrierCode, origin: &AirportCode, destination: &AirportCode) -> Value {
    json!({
        "carrier": carrier,
        "origin": origin,
        "destination": destination,
    })
}

impl Checker<'_> {
    fn push(&mut self, kind: Kind, category: Category, message: String, details: Option<Value>) {
        self.findings.push(Finding {
            kind,
            category,
            message,
            details,
        });
    }

    /// Every route with a destination, as `(origin, carrier, route)`.
    fn routes(&self) -> impl Iterator<Item = (&AirportCode, &CarrierCode, &Route)> {
        self.store.iter().flat_map(|(origin, shard)| {
            shard
                .routes()
                .filter(|(_, route)| !route.iata.is_blank())
                .map(move |(carrier, route)| (origin, carrier, route))
        })
    }

    fn check_structure(&mut self) {
        let category = Category::Structure;
        self.push(
            Kind::Info,
            category,
            format!("Loaded {} airport data files", self.store.len()),
            None,
        );

        let missing: Vec<AirportCode> = self
            .manifest
            .implemented_airports()
            .filter(|code| !self.store.contains(code))
            .cloned()
            .collect();
        for code in missing {
            self.push(
                Kind::Error,
                category,
                format!("Missing data file for implemented airport: {code}"),
                Some(json!({ "airport": code })),
            );
        }

        let orphans: Vec<AirportCode> = self
            .store
            .iter()
            .map(|(code, _)| code)
            .filter(|code| !self.manifest.airports.contains_key(*code))
            .cloned()
            .collect();
        for code in orphans {
            self.push(
                Kind::Warning,
                category,
                format!("Data file exists for airport not in coverage list: {code}"),
                Some(json!({ "airport": code })),
            );
        }

        let mislabelled: Vec<(String, Value)> = self
            .store
            .mislabelled()
            .map(|(code, declared)| {
                (
                    format!("Data file {code}.json declares airport {declared}"),
                    json!({ "file": format!("{code}.json"), "declared": declared }),
                )
            })
            .collect();
        for (message, details) in mislabelled {
            self.push(Kind::Warning, category, message, Some(details));
        }

        let duplicated: Vec<(String, Value)> = self
            .store
            .duplicate_declarations()
            .into_iter()
            .map(|(declared, codes)| {
                let files: Vec<String> = codes.iter().map(|c| format!("{c}.json")).collect();
                (
                    format!(
                        "Airport {declared} declared by multiple data files: {}",
                        files.join(", ")
                    ),
                    json!({ "airport": declared, "files": files }),
                )
            })
            .collect();
        for (message, details) in duplicated {
            self.push(Kind::Error, category, message, Some(details));
        }

        let mut malformed = Vec::new();
        for (origin, shard) in self.store.iter() {
            for (carrier, routes) in &shard.carriers {
                let mut seen = HashSet::new();
                for route in &routes.destinations {
                    let destination = &route.iata;
                    if destination.is_blank() {
                        malformed.push(format!("Route without destination: {carrier} {origin}"));
                        continue;
                    }
                    if route.intl.is_none() {
                        malformed.push(format!(
                            "Missing intl flag: {carrier} {origin}→{destination}"
                        ));
                    }
                    if !seen.insert(destination) {
                        malformed.push(format!(
                            "Duplicate route: {carrier} {origin}→{destination}"
                        ));
                    }
                }
            }
        }
        for message in malformed {
            self.push(Kind::Error, category, message, None);
        }
    }

    fn check_symmetry(&mut self) {
        let graph = RouteGraph::build(self.store);
        let missing: Vec<(String, Value)> = graph
            .missing_reverse_edges(self.store)
            .into_iter()
            .map(|edge| {
                let message = format!(
                    "Missing bidirectional route: {} {}⇄{} ({}→{} missing)",
                    edge.carrier, edge.origin, edge.destination, edge.destination, edge.origin
                );
                let details = route_details(&edge.carrier, &edge.origin, &edge.destination);
                (message, details)
            })
            .collect();
        for (message, details) in missing {
            self.push(Kind::Error, Category::Symmetry, message, Some(details));
        }
    }

    fn check_attribution(&mut self) {
        let mut results = Vec::new();
        for (origin, carrier, route) in self.routes() {
            let destination = &route.iata;
            let label = format!("{carrier} {origin}→{destination}");
            match &route.sources {
                Some(sources) if !sources.is_empty() => {
                    for source in sources.iter().filter(|s| !s.is_complete()) {
                        results.push((
                            Kind::Error,
                            format!("Invalid source structure: {label}"),
                            json!({
                                "carrier": carrier,
                                "origin": origin,
                                "destination": destination,
                                "source": source,
                            }),
                        ));
                    }
                }
                _ => results.push((
                    Kind::Error,
                    format!("Missing source attribution: {label}"),
                    route_details(carrier, origin, destination),
                )),
            }
            if route.last_checked.is_none() {
                results.push((
                    Kind::Warning,
                    format!("Missing lastChecked timestamp: {label}"),
                    route_details(carrier, origin, destination),
                ));
            }
        }
        for (kind, message, details) in results {
            self.push(kind, Category::Attribution, message, Some(details));
        }
    }

    fn check_coverage(&mut self) {
        let category = Category::Coverage;
        let coverage = calculate_coverage(self.manifest);
        let on_disk = self.store.len();
        if on_disk != coverage.airports.implemented {
            self.push(
                Kind::Error,
                category,
                format!(
                    "Coverage mismatch: {on_disk} data files vs {} in coverage list",
                    coverage.airports.implemented
                ),
                Some(json!({
                    "data_files": on_disk,
                    "implemented": coverage.airports.implemented,
                })),
            );
        }
        for (name, tally) in [("airports", coverage.airports), ("airlines", coverage.airlines)] {
            self.push(
                Kind::Info,
                category,
                format!(
                    "Coverage: {}/{} {name} ({}%)",
                    tally.implemented, tally.total, tally.coverage
                ),
                Some(json!(tally)),
            );
        }
    }

    fn check_metadata(&mut self) {
        let category = Category::Metadata;
        let mut results = Vec::new();

        for (code, _) in self.store.iter() {
            if !self.airports.contains(code) {
                results.push((
                    Kind::Warning,
                    format!("Airport {code} missing from airports.json metadata"),
                ));
            }
        }

        for code in self.manifest.implemented_airports() {
            if !self.airports.contains(code) {
                results.push((
                    Kind::Warning,
                    format!("Implemented airport {code} missing from airports.json metadata"),
                ));
            }
        }

        for (code, entry) in &self.airports.airports {
            let implemented = self.manifest.airport_status(code) == Some(Status::Implemented);
            if implemented && !self.store.contains(code) {
                results.push((
                    Kind::Error,
                    format!("Airport {code} in metadata but missing data file"),
                ));
            }
            if !entry.has_valid_position() {
                results.push((
                    Kind::Warning,
                    format!(
                        "Airport {code} has coordinates out of range ({}, {})",
                        entry.lat, entry.lon
                    ),
                ));
            }
        }

        for (origin, carrier, route) in self.routes() {
            let destination = &route.iata;
            let (Some(intl), Some(from), Some(to)) = (
                route.intl,
                self.airports.country(origin),
                self.airports.country(destination),
            ) else {
                continue;
            };
            if intl != (from != to) {
                results.push((
                    Kind::Warning,
                    format!(
                        "Route {carrier} {origin}→{destination} has intl={intl} but endpoints are in {from} and {to}"
                    ),
                ));
            }
        }

        let mut reported = BTreeSet::new();
        for (_, shard) in self.store.iter() {
            for carrier in shard.carriers.keys() {
                if !self.airlines.contains(carrier) && reported.insert(carrier) {
                    results.push((
                        Kind::Warning,
                        format!("Carrier {carrier} missing from airlines.json metadata"),
                    ));
                }
            }
        }

        for (kind, message) in results {
            self.push(kind, category, message, None);
        }
    }
}
