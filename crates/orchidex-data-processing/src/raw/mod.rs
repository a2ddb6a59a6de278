use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, instrument, warn};

#[cfg(feature = "download_data")]
pub mod fetch;

pub use super::error::Result;
use crate::DataError;
use crate::test_data::{TestDataConfig, create_test_data};

/// Published 67-field orchid dataset.
pub const DEFAULT_DATASET_URL: &str = "https://raw.githubusercontent.com/rashadul-se/orchids/refs/heads/main/orchid_complete_dataset_67fields_2025-11-16.csv";

/// Where catalog rows come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// A CSV export served over HTTP(S).
    Remote(String),
    /// A CSV export on local disk.
    CsvFile(PathBuf),
    /// Deterministic generated rows.
    TestData(TestDataConfig),
}

impl Default for DataSource {
    fn default() -> Self {
        Self::Remote(DEFAULT_DATASET_URL.to_string())
    }
}

impl DataSource {
    /// Name used for the processed cache file, `None` when the source is not cached.
    pub fn cache_name(&self) -> Option<String> {
        match self {
            Self::Remote(url) => {
                let file = url.rsplit('/').next().unwrap_or(url);
                let stem = file.strip_suffix(".csv").unwrap_or(file);
                Some(format!("{stem}.parquet"))
            }
            Self::TestData(config) => Some(format!("orchids_test_{}.parquet", config.rows)),
            Self::CsvFile(_) => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Remote(url) => Some(url),
            _ => None,
        }
    }
}

/// Materialise the source as a local CSV file.
///
/// Local files are copied so the caller always owns a temporary file that is
/// removed once processing finishes.
#[instrument(name = "Get raw orchid data", skip_all, level = "info")]
pub fn get_raw_data(source: &DataSource) -> Result<NamedTempFile> {
    match source {
        DataSource::CsvFile(path) => {
            if !path.exists() {
                warn!(path = ?path, "Source file not found");
                return Err(DataError::SourceNotFound(path.clone()));
            }
            info!(path = ?path, "Copying local CSV to temp file");
            copy_file_to_temp(path)
        }
        DataSource::TestData(config) => create_test_data(config),
        DataSource::Remote(url) => download(url),
    }
}

#[cfg(feature = "download_data")]
fn download(url: &str) -> Result<NamedTempFile> {
    fetch::download_dataset(url)
}

#[cfg(not(feature = "download_data"))]
fn download(url: &str) -> Result<NamedTempFile> {
    warn!(url, "download_data feature is disabled, cannot fetch remote source");
    Err(DataError::DownloadDisabled)
}

fn copy_file_to_temp(path: &Path) -> Result<NamedTempFile> {
    let temp = NamedTempFile::with_suffix(".csv")?;
    fs::copy(path, temp.path())?;
    Ok(temp)
}

/// Read a catalog CSV with every column as text. Typing happens when the frame
/// is conformed to the schema, so a bad cell nulls out instead of failing the read.
pub fn read_orchid_csv(path: impl AsRef<Path>) -> Result<LazyFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DataError::SourceNotFound(path.to_path_buf()));
    }
    Ok(LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_missing_is_null(true)
        .finish()?)
}
