pub use crate::components::airline_index::{AirlineEntry, AirlineIndex};
pub use crate::components::airport_index::{AirportEntry, AirportIndex};
pub use crate::components::carrier_source::{CarrierSourceTable, PLACEHOLDER_URL};
pub use crate::components::manifest::{
    AirlineInfo, AirportInfo, CoverageManifest, Status, MANIFEST_VERSION,
};
pub use crate::components::shard::{
    AirportShard, CarrierRoutes, Route, RouteSource, ShardSource, ShardStore,
};
pub use crate::components::wrappers::{AirportCode, CarrierCode, CountryCode, IsoDate};
