use proptest::prelude::*;
use route_audit::checker::validate;
use route_audit::components::prelude::*;
use route_audit::coverage::calculate_coverage;
use route_audit::graph::RouteGraph;
use route_audit::repair::repair;
use std::collections::HashSet;

const AIRPORTS: [&str; 5] = ["HND", "CTS", "OKA", "FUK", "ITM"];
const CARRIERS: [&str; 3] = ["NH", "JL", "ZZ"];

type RawRoute = (usize, usize, usize, Option<u32>, bool);

/// Builds a store holding a shard for every airport flagged in `with_shard`. Routes from
/// airports without a shard are dropped; routes to them are kept.
fn build_store(with_shard: &[bool], routes: &[RawRoute]) -> ShardStore {
    let mut store = ShardStore::default();
    for (code, present) in AIRPORTS.iter().zip(with_shard) {
        if *present {
            store.insert(AirportShard::new(
                AirportCode::from(*code),
                IsoDate::from("2025-01-01"),
            ));
        }
    }
    for (carrier, origin, destination, freq, intl) in routes {
        if origin == destination {
            continue;
        }
        let Some(shard) = store.get_mut(&AirportCode::from(AIRPORTS[*origin])) else {
            continue;
        };
        let mut route = Route::new(AirportCode::from(AIRPORTS[*destination]), *intl);
        route.freq_per_day = Some(*freq);
        shard.add_route(CarrierCode::from(CARRIERS[*carrier]), route);
    }
    store
}

fn dataset() -> impl Strategy<Value = ShardStore> {
    (
        proptest::collection::vec(any::<bool>(), AIRPORTS.len()),
        proptest::collection::vec(
            (
                0..CARRIERS.len(),
                0..AIRPORTS.len(),
                0..AIRPORTS.len(),
                proptest::option::of(1_u32..20),
                any::<bool>(),
            ),
            0..24,
        ),
    )
        .prop_map(|(with_shard, routes)| build_store(&with_shard, &routes))
}

fn today() -> IsoDate {
    IsoDate::from("2025-09-01")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn repair_is_idempotent(mut store in dataset()) {
        let sources = CarrierSourceTable::default();
        repair(&mut store, &sources, &today());
        let once = store.shards.clone();
        let second = repair(&mut store, &sources, &today());
        prop_assert_eq!(second.added_edges, 0);
        prop_assert!(second.updated_shards.is_empty());
        prop_assert_eq!(&store.shards, &once);
    }

    #[test]
    fn repair_closes_every_edge_between_shards(mut store in dataset()) {
        repair(&mut store, &CarrierSourceTable::default(), &today());
        let graph = RouteGraph::build(&store);
        for (origin, shard) in store.iter() {
            for (carrier, route) in shard.routes() {
                if store.contains(&route.iata) {
                    prop_assert!(
                        graph.has_edge(carrier, &route.iata, origin),
                        "{} {}→{} has no reverse", carrier, origin, route.iata
                    );
                }
            }
        }
        prop_assert!(graph.missing_reverse_edges(&store).is_empty());
    }

    #[test]
    fn repair_never_duplicates_a_destination(mut store in dataset()) {
        repair(&mut store, &CarrierSourceTable::default(), &today());
        for (_, shard) in store.iter() {
            for routes in shard.carriers.values() {
                let mut seen = HashSet::new();
                for route in &routes.destinations {
                    prop_assert!(seen.insert(route.iata.clone()), "duplicate {}", route.iata);
                }
            }
        }
    }

    #[test]
    fn repair_copies_forward_attributes(mut store in dataset()) {
        let before = store.clone();
        let outcome = repair(&mut store, &CarrierSourceTable::default(), &today());
        let mut added = 0_usize;
        for (origin, shard) in before.iter() {
            for (carrier, route) in shard.routes() {
                let Some(reverse_shard) = before.get(&route.iata) else {
                    continue;
                };
                if reverse_shard.has_route(carrier, origin) {
                    continue;
                }
                let synthesized = store
                    .get(&route.iata)
                    .and_then(|s| s.route(carrier, origin));
                prop_assert!(synthesized.is_some());
                if let Some(synthesized) = synthesized {
                    prop_assert_eq!(synthesized.intl, route.intl);
                    prop_assert_eq!(synthesized.freq_per_day, route.freq_per_day);
                    prop_assert_eq!(synthesized.last_checked.clone(), Some(today()));
                }
                added += 1;
            }
        }
        prop_assert_eq!(outcome.added_edges, added);
    }

    #[test]
    fn validation_is_pure(store in dataset()) {
        let airports = AirportIndex::default();
        let airlines = AirlineIndex::default();
        let manifest = CoverageManifest::default();
        let first = validate(&store, &airports, &airlines, &manifest);
        let second = validate(&store, &airports, &airlines, &manifest);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn coverage_stays_within_bounds(statuses in proptest::collection::vec(0_u8..3, 0..12)) {
        let mut manifest = CoverageManifest::default();
        for (i, status) in statuses.iter().enumerate() {
            let status = match status {
                0 => Status::Implemented,
                1 => Status::Planned,
                _ => Status::NotPlanned,
            };
            manifest.airlines.insert(
                CarrierCode::from(format!("C{i}")),
                AirlineInfo {
                    iata: None,
                    icao: None,
                    name: format!("Carrier {i}"),
                    name_en: None,
                    status,
                    kind: None,
                    base: None,
                },
            );
        }
        let coverage = calculate_coverage(&manifest);
        prop_assert!(coverage.airlines.coverage <= 100);
        prop_assert_eq!(coverage.airlines.total, statuses.len());
        prop_assert_eq!(coverage.airports.total, 0);
        prop_assert_eq!(coverage.airports.coverage, 0);
        if statuses.is_empty() {
            prop_assert_eq!(coverage.airlines.coverage, 0);
        }
    }
}
