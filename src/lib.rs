//! Consistency tooling for a sharded airline route dataset.
#![warn(
    clippy::all,
    clippy::restriction,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    rust_2018_idioms,
    missing_debug_implementations,
    missing_docs
)]
#![allow(clippy::module_inception)]
#![allow(clippy::implicit_return)]
#![allow(clippy::blanket_clippy_restriction_lints)]
#![allow(clippy::shadow_same)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::separated_literal_suffix)]
#![allow(clippy::float_arithmetic)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::use_self)]
#![allow(clippy::pattern_type_mismatch)]
#![allow(clippy::pub_use)]

use indicatif::style::TemplateError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::task::JoinError;

/// Holds the on-disk documents of the dataset
pub mod components;
/// Holds the documents together into one struct
pub mod dataset;
/// Builds the in-memory route graph
pub mod graph;
/// Checks the dataset for consistency
pub mod checker;
/// Repairs asymmetric routes and missing attribution
pub mod repair;
/// Computes coverage figures from the manifest
pub mod coverage;
/// Route filters
pub mod filters;

/// Errors that may occur when loading or writing the dataset.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DataError {
    /// Error while reading/writing to a file on disk.
    #[error("{0}")]
    IOError(#[from] std::io::Error),
    /// A JSON document could not be parsed.
    #[error("{}: {source}", path.display())]
    InvalidJson {
        /// The offending file
        path: PathBuf,
        /// The parse error
        source: serde_json::Error,
    },
    /// A document could not be serialized.
    #[error("{0}")]
    SerializeError(#[from] serde_json::Error),
    /// Error parsing a CSV table
    #[error("{0}")]
    CsvError(#[from] csv::Error),
    /// A required file was not found
    #[error("File not found: {}", .0.display())]
    FileNotFoundError(PathBuf),
    /// The shard directory does not exist
    #[error("Data directory not found: {}", .0.display())]
    DataDirNotFound(PathBuf),
    /// The coverage manifest declares a version this build does not understand
    #[error("Unsupported coverage manifest version: {0}")]
    UnsupportedManifestVersion(u32),
    /// A join error
    #[error("{0}")]
    JoinError(#[from] JoinError),
    /// An `indicatif` template error
    #[error("{0}")]
    TemplateError(#[from] TemplateError),
}

/// Deserializes a whole JSON document into a structure.
pub trait LoadJson
where
    Self: Sized,
{
    /// Deserializes the JSON file at `path`.
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON for `Self`.
    fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, DataError>;
}

impl<T: Sized + for<'de> Deserialize<'de>> LoadJson for T {
    #[inline]
    fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|source| DataError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Returns a vector of rows from a CSV file.
pub trait LoadCsv
where
    Self: Sized,
{
    /// Returns a vector of rows from a `;`-delimited CSV file.
    /// # Errors
    /// Returns an error if the file cannot be read.
    fn load_csv<P: AsRef<Path>>(path: P, has_headers: bool) -> Result<Vec<Self>, DataError>;
}

impl<T: Sized + for<'de> Deserialize<'de>> LoadCsv for T {
    #[inline]
    fn load_csv<P: AsRef<Path>>(path: P, has_headers: bool) -> Result<Vec<Self>, DataError> {
        let data = fs::read_to_string(path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(has_headers)
            .delimiter(b';')
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());
        let mut rows = Vec::new();
        for row in rdr.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }
}

/// Writes a structure as pretty-printed JSON with a trailing newline.
/// # Errors
/// Returns an error if the structure cannot be serialized or the file cannot be written.
#[inline]
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), DataError> {
    let mut data = serde_json::to_string_pretty(value)?;
    data.push('\n');
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)?;
    Ok(())
}

#[allow(clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::prelude::*;

    #[test]
    fn it_reports_the_path_of_invalid_json() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").expect("Failed to write file");
        let err = AirportIndex::load_json(&path).expect_err("broken json must not load");
        assert!(matches!(err, DataError::InvalidJson { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn it_writes_json_with_a_trailing_newline() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested/out.json");
        write_json(&path, &vec![1, 2]).expect("Failed to write json");
        let data = fs::read_to_string(&path).expect("Failed to read json");
        assert_eq!(data, "[\n  1,\n  2\n]\n");
    }
}
