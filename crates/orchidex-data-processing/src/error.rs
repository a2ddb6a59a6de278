use polars::prelude::PolarsError;
use thiserror::Error;
pub type Result<T> = std::result::Result<T, DataError>;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[cfg(feature = "download_data")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Remote data sources require the download_data feature")]
    DownloadDisabled,
    #[error("Source file not found: {0}")]
    SourceNotFound(std::path::PathBuf),
    #[error("Source has no header row or no recognised orchid columns")]
    NoRecognisedColumns,
}
