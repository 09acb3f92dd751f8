/// Holds the airline metadata index
pub mod airline_index;
/// Holds the airport metadata index
pub mod airport_index;
/// Holds the carrier timetable lookup
pub mod carrier_source;
/// Holds the coverage manifest
pub mod manifest;
/// Holds the public exports for the prelude
pub mod prelude;
/// Holds the airport shards and the shard store
pub mod shard;
/// Holds wrappers around primitive types
pub mod wrappers;
