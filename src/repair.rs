//! Mutating passes over the shard store.
//!
//! Both passes change shards in memory only and report which ones they touched. Writing those
//! shards back is left to [`ShardStore::save`].

use crate::components::prelude::*;
use crate::graph::{Edge, RouteGraph};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeSet;

/// What a symmetry repair did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct RepairOutcome {
    /// Shards that gained at least one route
    pub updated_shards: BTreeSet<AirportCode>,
    /// Reverse routes synthesized
    pub added_edges: usize,
    /// Routes left alone because their destination has no shard
    pub missing_shards: usize,
    /// Reverse routes left alone because the carrier already lists the origin
    pub duplicates: usize,
    /// Shards left alone because their `airport` field disagrees with their file name
    pub mislabelled_shards: BTreeSet<AirportCode>,
}

/// A forward route whose reverse is missing, with the attributes the reverse copies.
struct MissingReverse {
    edge: Edge,
    freq_per_day: Option<Option<u32>>,
    intl: Option<bool>,
}

/// Adds the reverse of every route whose destination has a shard but does not fly back.
///
/// The reverse route copies the forward route's frequency and `intl` flag, cites the carrier's
/// timetable from `sources` and is marked as checked on `today`. Every mutated shard gets
/// `updatedAt = today`. Running it again on the result adds nothing. Shards whose `airport`
/// field disagrees with their file name are neither read from nor written to.
#[inline]
pub fn repair(
    store: &mut ShardStore,
    sources: &CarrierSourceTable,
    today: &IsoDate,
) -> RepairOutcome {
    let graph = RouteGraph::build(store);
    let mut outcome = RepairOutcome::default();

    let mut missing = Vec::new();
    for (origin, shard) in store.iter() {
        if !store.is_labelled_correctly(origin) {
            warn!(
                "Skipping {origin}.json: it declares airport {}",
                shard.airport
            );
            outcome.mislabelled_shards.insert(origin.clone());
            continue;
        }
        for (carrier, route) in shard.routes() {
            let destination = &route.iata;
            if destination.is_blank() {
                continue;
            }
            if !store.contains(destination) {
                info!("Skipping {carrier} {origin}→{destination}: no shard for {destination}");
                outcome.missing_shards += 1;
                continue;
            }
            if !store.is_labelled_correctly(destination) {
                warn!("Skipping {carrier} {origin}→{destination}: {destination}.json is mislabelled");
                outcome.mislabelled_shards.insert(destination.clone());
                continue;
            }
            if graph.has_edge(carrier, destination, origin) {
                continue;
            }
            missing.push(MissingReverse {
                edge: Edge::new(carrier.clone(), origin.clone(), destination.clone()),
                freq_per_day: route.freq_per_day,
                intl: route.intl,
            });
        }
    }
    debug!("Found {} missing reverse routes", missing.len());

    for MissingReverse {
        edge,
        freq_per_day,
        intl,
    } in missing
    {
        let Some(shard) = store.get_mut(&edge.destination) else {
            warn!("Shard {} disappeared during repair", edge.destination);
            outcome.missing_shards += 1;
            continue;
        };
        let reverse = Route {
            iata: edge.origin.clone(),
            freq_per_day,
            intl,
            sources: Some(vec![sources.source_for(&edge.carrier)]),
            last_checked: Some(today.clone()),
            ..Route::default()
        };
        if !shard.add_route(edge.carrier.clone(), reverse) {
            info!(
                "Route already exists: {} {}→{}",
                edge.carrier, edge.destination, edge.origin
            );
            outcome.duplicates += 1;
            continue;
        }
        shard.updated_at = today.clone();
        info!(
            "Added reverse route: {} {}→{}",
            edge.carrier, edge.destination, edge.origin
        );
        outcome.added_edges += 1;
        outcome.updated_shards.insert(edge.destination);
    }
    outcome
}

/// What a source attribution backfill did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct AttributionOutcome {
    /// Routes looked at
    pub routes_processed: usize,
    /// Routes that received a citation
    pub routes_updated: usize,
    /// Of those, routes that received the "requires verification" placeholder
    pub placeholders: usize,
    /// Shards that were changed
    pub updated_shards: BTreeSet<AirportCode>,
}

/// Cites the carrier's timetable on every route without sources, marking it checked on `today`.
///
/// Carriers missing from `sources` get the placeholder citation so the route still needs a
/// human to verify it. Routes that already cite something are left alone.
#[inline]
pub fn attribute_sources(
    store: &mut ShardStore,
    sources: &CarrierSourceTable,
    today: &IsoDate,
) -> AttributionOutcome {
    let mut outcome = AttributionOutcome::default();
    for (code, shard) in &mut store.shards {
        let mut changed = false;
        for (carrier, routes) in &mut shard.carriers {
            for route in &mut routes.destinations {
                outcome.routes_processed += 1;
                if route.is_attributed() {
                    continue;
                }
                if sources.knows(carrier) {
                    info!("Added source: {carrier} {code}→{}", route.iata);
                } else {
                    warn!(
                        "Added placeholder: {carrier} {code}→{} (requires verification)",
                        route.iata
                    );
                    outcome.placeholders += 1;
                }
                route.sources = Some(vec![sources.source_for(carrier)]);
                route.last_checked = Some(today.clone());
                outcome.routes_updated += 1;
                changed = true;
            }
        }
        if changed {
            shard.updated_at = today.clone();
            outcome.updated_shards.insert(code.clone());
        }
    }
    outcome
}
