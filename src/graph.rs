use crate::components::prelude::*;
use std::collections::{HashMap, HashSet};

/// A directed route edge `origin --carrier--> destination`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub struct Edge {
    /// The operating carrier
    pub carrier: CarrierCode,
    /// The airport the route departs from
    pub origin: AirportCode,
    /// The airport the route arrives at
    pub destination: AirportCode,
}

impl Edge {
    /// Creates an edge.
    #[must_use]
    #[inline]
    pub const fn new(carrier: CarrierCode, origin: AirportCode, destination: AirportCode) -> Self {
        Self {
            carrier,
            origin,
            destination,
        }
    }

    /// The same carrier flying the other way.
    #[must_use]
    #[inline]
    pub fn reversed(&self) -> Self {
        Self::new(
            self.carrier.clone(),
            self.destination.clone(),
            self.origin.clone(),
        )
    }
}

/// Index of every route edge in a shard store, keyed by `(carrier, origin)`.
///
/// Built from scratch on every run and never persisted.
#[derive(Debug, Clone, Default)]
pub struct RouteGraph {
    edges: HashMap<(CarrierCode, AirportCode), HashSet<AirportCode>>,
    empty: HashSet<AirportCode>,
}

impl RouteGraph {
    /// Registers every route of every shard. Never fails: routes without a destination are
    /// skipped and left for the checker to report.
    #[must_use]
    #[inline]
    pub fn build(store: &ShardStore) -> Self {
        let mut graph = Self::default();
        for (origin, shard) in store.iter() {
            for (carrier, route) in shard.routes() {
                if route.iata.is_blank() {
                    continue;
                }
                graph
                    .edges
                    .entry((carrier.clone(), origin.clone()))
                    .or_default()
                    .insert(route.iata.clone());
            }
        }
        graph
    }

    /// Whether `carrier` flies `from` to `to`.
    #[must_use]
    #[inline]
    pub fn has_edge(&self, carrier: &CarrierCode, from: &AirportCode, to: &AirportCode) -> bool {
        self.edges
            .get(&(carrier.clone(), from.clone()))
            .map_or(false, |d| d.contains(to))
    }

    /// The destinations `carrier` serves from `from`.
    #[must_use]
    #[inline]
    pub fn edges_from(&self, carrier: &CarrierCode, from: &AirportCode) -> &HashSet<AirportCode> {
        self.edges
            .get(&(carrier.clone(), from.clone()))
            .unwrap_or(&self.empty)
    }

    /// The number of distinct edges.
    #[must_use]
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(HashSet::len).sum()
    }

    /// Edges whose destination has a shard but whose reverse edge is absent, in shard order.
    #[must_use]
    #[inline]
    pub fn missing_reverse_edges(&self, store: &ShardStore) -> Vec<Edge> {
        let mut missing = Vec::new();
        for (origin, shard) in store.iter() {
            for (carrier, route) in shard.routes() {
                let destination = &route.iata;
                if route.iata.is_blank() || !store.contains(destination) {
                    continue;
                }
                if !self.has_edge(carrier, destination, origin) {
                    missing.push(Edge::new(
                        carrier.clone(),
                        origin.clone(),
                        destination.clone(),
                    ));
                }
            }
        }
        missing
    }
}

#[allow(clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn fixture() -> ShardStore {
        ShardStore::from_dir(Path::new("./test/airports")).expect("Failed to read shards")
    }

    #[test]
    fn it_indexes_every_route() {
        let graph = RouteGraph::build(&fixture());
        assert_eq!(graph.edge_count(), 8);
        let nh = CarrierCode::from("NH");
        let hnd = AirportCode::from("HND");
        assert!(graph.has_edge(&nh, &hnd, &AirportCode::from("XXX")));
        assert!(!graph.has_edge(&nh, &AirportCode::from("CTS"), &hnd));
        assert_eq!(graph.edges_from(&nh, &hnd).len(), 3);
    }

    #[test]
    fn it_returns_no_destinations_for_unknown_origins() {
        let graph = RouteGraph::build(&fixture());
        assert!(graph
            .edges_from(&CarrierCode::from("ZZ"), &AirportCode::from("HND"))
            .is_empty());
    }

    #[test]
    fn it_skips_routes_without_a_destination() {
        let mut store = ShardStore::default();
        let mut shard = AirportShard::new(AirportCode::from("HND"), IsoDate::from("2025-01-01"));
        shard.add_route(CarrierCode::from("NH"), Route::default());
        store.insert(shard);
        let graph = RouteGraph::build(&store);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn it_finds_missing_reverse_edges() {
        let store = fixture();
        let graph = RouteGraph::build(&store);
        let missing = graph.missing_reverse_edges(&store);
        assert_eq!(
            missing,
            vec![Edge::new(
                CarrierCode::from("NH"),
                AirportCode::from("HND"),
                AirportCode::from("CTS")
            )]
        );
        assert_eq!(missing[0].reversed().origin, AirportCode::from("CTS"));
    }
}
