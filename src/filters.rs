use crate::components::prelude::*;

/// Whether a route stays inside Japan. Routes touching an airport missing from the index are
/// never domestic.
#[must_use]
#[inline]
pub fn is_domestic(from: &AirportCode, to: &AirportCode, airports: &AirportIndex) -> bool {
    let japan = CountryCode::japan();
    airports.country(from) == Some(&japan) && airports.country(to) == Some(&japan)
}

/// The routes of one shard, optionally narrowed to a carrier and to domestic routes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct RouteFilter {
    /// Only routes of this carrier
    pub carrier: Option<CarrierCode>,
    /// Only routes within Japan
    pub domestic_only: bool,
}

impl RouteFilter {
    /// Creates a filter.
    #[must_use]
    #[inline]
    pub const fn new(carrier: Option<CarrierCode>, domestic_only: bool) -> Self {
        Self {
            carrier,
            domestic_only,
        }
    }

    /// The routes of `shard` that pass the filter, in carrier order then list order.
    #[inline]
    pub fn apply<'a>(
        &'a self,
        shard: &'a AirportShard,
        airports: &'a AirportIndex,
    ) -> impl Iterator<Item = (&'a CarrierCode, &'a Route)> + 'a {
        shard.routes().filter(move |(carrier, route)| {
            self.carrier.as_ref().map_or(true, |c| c == *carrier)
                && (!self.domestic_only || is_domestic(&shard.airport, &route.iata, airports))
        })
    }
}
