use crate::checker::{validate, ValidationReport};
use crate::components::prelude::*;
use crate::coverage::{calculate_coverage, Coverage};
use crate::repair::{attribute_sources, repair, AttributionOutcome, RepairOutcome};
use crate::DataError;
use indicatif::{InMemoryTerm, ProgressBar, ProgressDrawTarget, ProgressStyle, TermLike};
use log::info;
use std::path::{Path, PathBuf};
use tokio::try_join;

/// Where the documents of a dataset live.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct DataPaths {
    /// The root data directory
    pub data_dir: PathBuf,
    /// `<data_dir>/airports`, one `<IATA>.json` per airport
    pub shard_dir: PathBuf,
    /// `<data_dir>/airports.json`
    pub airports: PathBuf,
    /// `<data_dir>/airlines.json`
    pub airlines: PathBuf,
    /// `<data_dir>/coverage.json` unless overridden
    pub manifest: PathBuf,
    /// `<data_dir>/carrier_sources.csv`
    pub carrier_sources: PathBuf,
}

impl DataPaths {
    /// The standard layout under `data_dir`.
    #[must_use]
    #[inline]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            shard_dir: data_dir.join("airports"),
            airports: data_dir.join("airports.json"),
            airlines: data_dir.join("airlines.json"),
            manifest: data_dir.join("coverage.json"),
            carrier_sources: data_dir.join("carrier_sources.csv"),
        }
    }

    /// Reads the coverage manifest from `manifest` instead.
    #[must_use]
    #[inline]
    pub fn with_manifest(mut self, manifest: PathBuf) -> Self {
        self.manifest = manifest;
        self
    }
}

/// Every document of the dataset, loaded together.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Dataset {
    /// The airport shards
    pub shards: ShardStore,
    /// `airports.json`
    pub airports: AirportIndex,
    /// `airlines.json`
    pub airlines: AirlineIndex,
    /// The coverage manifest
    pub manifest: CoverageManifest,
    /// Carrier timetables used when synthesizing citations
    pub carrier_sources: CarrierSourceTable,
}

impl Dataset {
    /// Loads the dataset, reading the documents concurrently.
    /// If `terminal` is given, shard loading progress is drawn to it.
    /// # Errors
    /// * If the data directory or the shard directory does not exist
    /// * If the coverage manifest is missing or has an unsupported version
    /// * If any document cannot be read or parsed
    #[inline]
    pub async fn new(paths: &DataPaths, terminal: &Option<InMemoryTerm>) -> Result<Self, DataError> {
        let progress = terminal.as_ref().map_or_else(ProgressBar::hidden, |term| {
            ProgressBar::with_draw_target(
                None,
                ProgressDrawTarget::term_like(Box::new(term.clone()) as Box<dyn TermLike>),
            )
        });
        Self::load(paths, progress).await
    }

    /// Loads the dataset, reading the documents concurrently and advancing `progress` once per
    /// shard. The bar is finished once every document is read.
    /// # Errors
    /// * If the data directory or the shard directory does not exist
    /// * If the coverage manifest is missing or has an unsupported version
    /// * If any document cannot be read or parsed
    #[inline]
    pub async fn load(paths: &DataPaths, progress: ProgressBar) -> Result<Self, DataError> {
        if !paths.data_dir.is_dir() {
            return Err(DataError::DataDirNotFound(paths.data_dir.clone()));
        }
        progress.set_style(ProgressStyle::default_bar().template("{msg} {pos}/{len}")?);
        progress.set_message("Loading shards");

        let shards_handle = {
            let dir = paths.shard_dir.clone();
            let progress = progress.clone();
            tokio::task::spawn_blocking(move || ShardStore::from_dir_with_progress(&dir, &progress))
        };
        let airports_handle = {
            let path = paths.airports.clone();
            tokio::task::spawn_blocking(move || AirportIndex::from_file(&path))
        };
        let airlines_handle = {
            let path = paths.airlines.clone();
            tokio::task::spawn_blocking(move || AirlineIndex::from_file(&path))
        };
        let manifest_handle = {
            let path = paths.manifest.clone();
            tokio::task::spawn_blocking(move || CoverageManifest::from_file(&path))
        };
        let sources_handle = {
            let path = paths.carrier_sources.clone();
            tokio::task::spawn_blocking(move || CarrierSourceTable::from_file(&path))
        };

        let (shards_result, airports_result, airlines_result, manifest_result, sources_result) = try_join!(
            shards_handle,
            airports_handle,
            airlines_handle,
            manifest_handle,
            sources_handle
        )?;
        let shards = shards_result?;
        progress.finish_with_message("Loaded shards");

        let dataset = Self {
            shards,
            airports: airports_result?,
            airlines: airlines_result?,
            manifest: manifest_result?,
            carrier_sources: sources_result?,
        };
        info!(
            "Loaded {} shards, {} airports, {} airlines",
            dataset.shards.len(),
            dataset.airports.airports.len(),
            dataset.airlines.airlines.len()
        );
        Ok(dataset)
    }

    /// Runs every consistency check.
    #[must_use]
    #[inline]
    pub fn validate(&self) -> ValidationReport {
        validate(&self.shards, &self.airports, &self.airlines, &self.manifest)
    }

    /// Coverage figures of the manifest.
    #[must_use]
    #[inline]
    pub fn coverage(&self) -> Coverage {
        calculate_coverage(&self.manifest)
    }

    /// Adds missing reverse routes and writes back the shards that changed.
    /// # Errors
    /// If a changed shard cannot be written.
    #[inline]
    pub fn repair(&mut self, today: &IsoDate) -> Result<RepairOutcome, DataError> {
        let outcome = repair(&mut self.shards, &self.carrier_sources, today);
        self.shards.save(&outcome.updated_shards)?;
        Ok(outcome)
    }

    /// Cites sources on unattributed routes and writes back the shards that changed.
    /// # Errors
    /// If a changed shard cannot be written.
    #[inline]
    pub fn attribute(&mut self, today: &IsoDate) -> Result<AttributionOutcome, DataError> {
        let outcome = attribute_sources(&mut self.shards, &self.carrier_sources, today);
        self.shards.save(&outcome.updated_shards)?;
        Ok(outcome)
    }
}

/// Recursively copies `from` into `to`. Used to give mutating tests a private dataset.
#[cfg(test)]
pub(crate) fn copy_dir(from: &Path, to: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

#[allow(clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[tokio::test]
    async fn it_loads_a_dataset() {
        let dataset = Dataset::new(&DataPaths::new(Path::new("./test")), &None).await;
        assert!(dataset.is_ok());
    }

    #[tokio::test]
    async fn it_draws_progress_to_a_terminal() {
        let term = InMemoryTerm::new(16, 80);
        let dataset = Dataset::new(&DataPaths::new(Path::new("./test")), &Some(term.clone()))
            .await
            .expect("Failed to load dataset");
        assert_eq!(dataset.shards.len(), 4);
        assert!(term.contents().contains("Loaded shards"));
    }

    #[tokio::test]
    async fn it_advances_a_caller_supplied_progress_bar() {
        let bar = ProgressBar::hidden();
        let dataset = Dataset::load(&DataPaths::new(Path::new("./test")), bar.clone())
            .await
            .expect("Failed to load dataset");
        assert_eq!(dataset.shards.len(), 4);
        assert_eq!(bar.length(), Some(4));
        assert_eq!(bar.position(), 4);
        assert!(bar.is_finished());
    }

    #[tokio::test]
    async fn it_refuses_a_missing_data_dir() {
        let err = Dataset::new(&DataPaths::new(Path::new("./test/no-such-dir")), &None)
            .await
            .expect_err("missing data dir must fail");
        assert!(matches!(err, DataError::DataDirNotFound(_)));
    }

    #[tokio::test]
    async fn it_honours_a_manifest_override() {
        let paths = DataPaths::new(Path::new("./test"))
            .with_manifest(PathBuf::from("./test/missing-manifest.json"));
        let err = Dataset::new(&paths, &None)
            .await
            .expect_err("missing manifest must fail");
        assert!(matches!(err, DataError::FileNotFoundError(_)));
    }

    #[tokio::test]
    async fn it_validates_the_fixture() {
        let dataset = Dataset::new(&DataPaths::new(Path::new("./test")), &None)
            .await
            .expect("Failed to load dataset");
        let summary = dataset.validate().summary();
        assert_eq!((summary.info, summary.warning, summary.error), (3, 2, 4));
        assert_eq!(dataset.coverage().airports.coverage, 80);
    }

    #[tokio::test]
    async fn it_repairs_and_writes_back_only_changed_shards() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        copy_dir(Path::new("./test"), dir.path()).expect("Failed to copy fixture");
        let paths = DataPaths::new(dir.path());
        let hnd_before =
            std::fs::read_to_string(paths.shard_dir.join("HND.json")).expect("HND.json missing");

        let mut dataset = Dataset::new(&paths, &None)
            .await
            .expect("Failed to load dataset");
        let outcome = dataset
            .repair(&IsoDate::from("2025-09-01"))
            .expect("Failed to repair");
        assert_eq!(outcome.added_edges, 1);
        assert_eq!(
            outcome.updated_shards,
            BTreeSet::from([AirportCode::from("CTS")])
        );

        let hnd_after =
            std::fs::read_to_string(paths.shard_dir.join("HND.json")).expect("HND.json missing");
        assert_eq!(hnd_before, hnd_after);

        let reloaded = Dataset::new(&paths, &None)
            .await
            .expect("Failed to reload dataset");
        let cts = reloaded
            .shards
            .get(&AirportCode::from("CTS"))
            .expect("CTS shard missing");
        assert_eq!(cts.updated_at, IsoDate::from("2025-09-01"));
        assert!(cts.has_route(&CarrierCode::from("NH"), &AirportCode::from("HND")));
        assert!(reloaded
            .validate()
            .findings
            .iter()
            .all(|f| !f.message.starts_with("Missing bidirectional route")));
    }

    #[tokio::test]
    async fn it_backfills_attribution_on_disk() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        copy_dir(Path::new("./test"), dir.path()).expect("Failed to copy fixture");
        let paths = DataPaths::new(dir.path());
        let mut dataset = Dataset::new(&paths, &None)
            .await
            .expect("Failed to load dataset");
        let outcome = dataset
            .attribute(&IsoDate::from("2025-09-01"))
            .expect("Failed to attribute");
        assert_eq!(outcome.routes_updated, 1);

        let reloaded = Dataset::new(&paths, &None)
            .await
            .expect("Failed to reload dataset");
        assert!(reloaded
            .validate()
            .findings
            .iter()
            .all(|f| !f.message.starts_with("Missing source attribution")));
    }
}
