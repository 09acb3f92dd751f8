use crate::components::wrappers::{AirportCode, CarrierCode, IsoDate};
use crate::{write_json, DataError, LoadJson};
use indicatif::ProgressBar;
use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// A citation backing a single route.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct RouteSource {
    /// Human readable title, e.g. the name of a timetable.
    #[serde(default)]
    pub title: String,
    /// Where the route can be verified.
    #[serde(default)]
    pub url: String,
}

impl RouteSource {
    /// Whether both the title and the url are filled in.
    #[must_use]
    #[inline]
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// Shard-level provenance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ShardSource {
    /// Where the shard's data came from
    #[serde(default)]
    pub url: String,
    /// When the source was last consulted
    #[serde(rename = "lastChecked", default)]
    pub last_checked: IsoDate,
    /// What the source is
    #[serde(default)]
    pub description: String,
}

/// Absent stays `None`, an explicit `null` becomes `Some(None)`.
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<u32>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<u32>::deserialize(deserializer).map(Some)
}

/// A directed route from the shard's airport to `iata`, flown by one carrier.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Route {
    /// The destination airport.
    #[serde(default)]
    pub iata: AirportCode,
    /// Flights per day. The outer `Option` is whether the field is present at all,
    /// the inner one is `null` (unknown).
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub freq_per_day: Option<Option<u32>>,
    /// Whether the endpoints are in different countries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intl: Option<bool>,
    /// Citations for the route. Required for a validated route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<RouteSource>>,
    /// When the route was last verified.
    #[serde(
        rename = "lastChecked",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_checked: Option<IsoDate>,
    /// Fields this crate does not interpret, kept so a rewrite does not lose them.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Route {
    /// Creates a route to `iata` with no frequency, sources or check date.
    #[must_use]
    #[inline]
    pub fn new(iata: AirportCode, intl: bool) -> Self {
        Self {
            iata,
            intl: Some(intl),
            ..Self::default()
        }
    }

    /// Whether the route has at least one source.
    #[must_use]
    #[inline]
    pub fn is_attributed(&self) -> bool {
        self.sources.as_ref().map_or(false, |s| !s.is_empty())
    }
}

/// The routes of one carrier at one airport.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CarrierRoutes {
    /// The destinations served from the shard's airport.
    #[serde(default)]
    pub destinations: Vec<Route>,
    /// Fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The route document of a single airport, stored as `<IATA>.json`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct AirportShard {
    /// The airport this shard describes.
    #[serde(default)]
    pub airport: AirportCode,
    /// When the shard was last mutated.
    #[serde(rename = "updatedAt", default)]
    pub updated_at: IsoDate,
    /// Shard-level provenance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Vec<ShardSource>>,
    /// The routes by carrier.
    #[serde(default)]
    pub carriers: BTreeMap<CarrierCode, CarrierRoutes>,
    /// Fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl AirportShard {
    /// Creates an empty shard.
    #[must_use]
    #[inline]
    pub fn new(airport: AirportCode, updated_at: IsoDate) -> Self {
        Self {
            airport,
            updated_at,
            ..Self::default()
        }
    }

    /// Every route in the shard with its carrier, in carrier order then list order.
    #[inline]
    pub fn routes(&self) -> impl Iterator<Item = (&CarrierCode, &Route)> {
        self.carriers
            .iter()
            .flat_map(|(carrier, routes)| routes.destinations.iter().map(move |r| (carrier, r)))
    }

    /// Looks up the first route of `carrier` to `destination`.
    #[must_use]
    #[inline]
    pub fn route(&self, carrier: &CarrierCode, destination: &AirportCode) -> Option<&Route> {
        self.carriers
            .get(carrier)?
            .destinations
            .iter()
            .find(|r| &r.iata == destination)
    }

    /// Whether `carrier` already lists `destination`.
    #[must_use]
    #[inline]
    pub fn has_route(&self, carrier: &CarrierCode, destination: &AirportCode) -> bool {
        self.route(carrier, destination).is_some()
    }

    /// Appends a route unless the carrier already lists that destination.
    /// Returns whether the route was added.
    #[inline]
    pub fn add_route(&mut self, carrier: CarrierCode, route: Route) -> bool {
        let routes = self.carriers.entry(carrier).or_default();
        if routes.destinations.iter().any(|r| r.iata == route.iata) {
            return false;
        }
        routes.destinations.push(route);
        true
    }
}

/// All airport shards together with the directory they live in.
///
/// Shards read from disk are keyed by their file name, which normally equals their `airport`
/// field. See [`ShardStore::mislabelled`] for the ones where it does not.
#[derive(Debug, Clone, Default)]
pub struct ShardStore {
    /// The directory holding `<IATA>.json` files.
    pub dir: PathBuf,
    /// The shards by the code they are stored under.
    pub shards: BTreeMap<AirportCode, AirportShard>,
}

impl ShardStore {
    /// Creates an empty store rooted at `dir`. Nothing is read or written.
    #[must_use]
    #[inline]
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            shards: BTreeMap::new(),
        }
    }

    /// Loads every `*.json` file in `dir`.
    /// # Errors
    /// * If `dir` does not exist
    /// * If a shard cannot be read or is not valid JSON
    #[inline]
    pub fn from_dir(dir: &Path) -> Result<Self, DataError> {
        Self::from_dir_with_progress(dir, &ProgressBar::hidden())
    }

    /// Loads every `*.json` file in `dir`, advancing `progress` once per shard.
    /// # Errors
    /// * If `dir` does not exist
    /// * If a shard cannot be read or is not valid JSON
    #[inline]
    pub fn from_dir_with_progress(dir: &Path, progress: &ProgressBar) -> Result<Self, DataError> {
        if !dir.is_dir() {
            return Err(DataError::DataDirNotFound(dir.to_path_buf()));
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |e| e == "json") {
                files.push(path);
            }
        }
        files.sort();
        progress.set_length(files.len() as u64);

        let mut store = Self::new(dir.to_path_buf());
        for path in files {
            debug!("Loading {}", path.display());
            let mut shard = AirportShard::load_json(&path)?;
            let stem = path
                .file_stem()
                .map(|s| AirportCode(s.to_string_lossy().into_owned()))
                .unwrap_or_default();
            if shard.airport.is_blank() {
                warn!("{} has no airport code, using its file name", path.display());
                shard.airport = stem.clone();
            } else if shard.airport != stem {
                warn!(
                    "{} declares airport {}, keying it by its file name",
                    path.display(),
                    shard.airport
                );
            }
            // Keyed by file so a save always writes back to the file it was read from.
            store.shards.insert(stem, shard);
            progress.inc(1);
        }
        info!("Loaded {} shards from {}", store.len(), dir.display());
        Ok(store)
    }

    /// Adds or replaces a shard.
    #[inline]
    pub fn insert(&mut self, shard: AirportShard) -> Option<AirportShard> {
        self.shards.insert(shard.airport.clone(), shard)
    }

    /// The shard for `code`, if any.
    #[must_use]
    #[inline]
    pub fn get(&self, code: &AirportCode) -> Option<&AirportShard> {
        self.shards.get(code)
    }

    /// The shard for `code`, if any.
    #[inline]
    pub fn get_mut(&mut self, code: &AirportCode) -> Option<&mut AirportShard> {
        self.shards.get_mut(code)
    }

    /// Whether a shard exists for `code`.
    #[must_use]
    #[inline]
    pub fn contains(&self, code: &AirportCode) -> bool {
        self.shards.contains_key(code)
    }

    /// The number of shards.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    /// Whether the store has no shards.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// The shards in airport code order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&AirportCode, &AirportShard)> {
        self.shards.iter()
    }

    /// Shards whose `airport` field disagrees with the code they are stored under, as
    /// `(stored code, declared code)`.
    #[inline]
    pub fn mislabelled(&self) -> impl Iterator<Item = (&AirportCode, &AirportCode)> {
        self.shards
            .iter()
            .filter(|(code, shard)| !shard.airport.is_blank() && shard.airport != **code)
            .map(|(code, shard)| (code, &shard.airport))
    }

    /// Whether the shard stored under `code` declares that same code.
    #[must_use]
    #[inline]
    pub fn is_labelled_correctly(&self, code: &AirportCode) -> bool {
        self.shards
            .get(code)
            .map_or(false, |shard| &shard.airport == code)
    }

    /// Airports declared by more than one shard, with the codes of the shards declaring them.
    #[must_use]
    #[inline]
    pub fn duplicate_declarations(&self) -> BTreeMap<&AirportCode, Vec<&AirportCode>> {
        let mut declared: BTreeMap<&AirportCode, Vec<&AirportCode>> = BTreeMap::new();
        for (code, shard) in &self.shards {
            if !shard.airport.is_blank() {
                declared.entry(&shard.airport).or_default().push(code);
            }
        }
        declared.retain(|_, codes| codes.len() > 1);
        declared
    }

    /// The file a shard is stored in.
    #[must_use]
    #[inline]
    pub fn shard_path(&self, code: &AirportCode) -> PathBuf {
        self.dir.join(format!("{code}.json"))
    }

    /// Writes the given shards back to disk. Codes without a shard are ignored.
    /// # Errors
    /// If a shard cannot be written.
    #[inline]
    pub fn save(&self, codes: &BTreeSet<AirportCode>) -> Result<usize, DataError> {
        let mut written = 0_usize;
        for code in codes {
            if let Some(shard) = self.shards.get(code) {
                let path = self.shard_path(code);
                write_json(&path, shard)?;
                info!("Updated {}", path.display());
                written += 1;
            }
        }
        Ok(written)
    }
}
