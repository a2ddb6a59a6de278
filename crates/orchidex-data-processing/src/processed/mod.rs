use super::error::Result;
use crate::DataError;
use crate::raw::{DataSource, get_raw_data, read_orchid_csv};
use crate::schema::{ID_COLUMN, ORCHID_SCHEMA, canonical_column_name, is_known_column};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use once_cell::sync::OnceCell;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, info_span, instrument, warn};

/// Bring an arbitrary catalog frame into the fixed schema.
///
/// Source headers are mapped through [`canonical_column_name`], columns outside
/// the schema are dropped, missing ones become null, text is trimmed with
/// empty cells nulled and numeric columns are cast leniently.
pub fn conform_to_schema(mut lf: LazyFrame) -> Result<LazyFrame> {
    let source_schema = lf.collect_schema()?;
    let source_names = source_schema.iter_names().cloned().collect_vec();

    let (known, unknown): (Vec<_>, Vec<_>) = source_names.iter().partition(|name| {
        let canonical = canonical_column_name(name.as_str());
        canonical != ID_COLUMN && is_known_column(canonical)
    });
    if known.is_empty() {
        return Err(DataError::NoRecognisedColumns);
    }
    if !unknown.is_empty() {
        warn!(columns = ?unknown, "Dropping columns outside the orchid schema");
    }

    let exprs = ORCHID_SCHEMA
        .iter()
        .map(|(name, dtype)| {
            known
                .iter()
                .find(|source| canonical_column_name(source.as_str()) == name.as_str())
                .map_or_else(
                    || lit(NULL).cast(dtype.clone()),
                    |source| conform_column(col((*source).clone()), dtype),
                )
                .alias(name.clone())
        })
        .collect_vec();

    Ok(lf.select(exprs))
}

fn conform_column(expr: Expr, dtype: &DataType) -> Expr {
    let trimmed = expr.cast(DataType::String).str().strip_chars(lit(NULL));
    let text = when(trimmed.clone().eq(lit("")))
        .then(lit(NULL).cast(DataType::String))
        .otherwise(trimmed);
    match dtype {
        DataType::String => text,
        // "60.0" style integers survive the detour through floats
        DataType::Int64 => text.cast(DataType::Float64).cast(DataType::Int64),
        other => text.cast(other.clone()),
    }
}

/// Run a source through download/copy, CSV read and schema conformance.
#[instrument(name = "Process orchid data", skip_all, level = "info")]
pub fn process_source(source: &DataSource) -> Result<DataFrame> {
    let raw = get_raw_data(source)?;
    let t = std::time::Instant::now();
    let df = conform_to_schema(read_orchid_csv(raw.path())?)?.collect()?;
    info!(rows = df.height(), elapsed = ?t.elapsed(), "Conformed raw rows to schema");
    Ok(df)
}

/// Sidecar written next to each cached Parquet file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedMetadata {
    pub source: String,
    pub rows: usize,
    pub generated_at: DateTime<Utc>,
}

/// Processed catalog rows, cached as Parquet in the data directory for sources
/// that can be cached and loaded into memory on first access.
#[derive(Debug, Clone)]
pub struct OrchidData {
    parquet_path: Option<PathBuf>,
    frame: OnceCell<DataFrame>,
}

impl OrchidData {
    pub fn new(source: &DataSource) -> Result<Self> {
        let Some(cache_name) = source.cache_name() else {
            info!("OrchidData: Source is not cached, processing directly");
            return Ok(Self {
                parquet_path: None,
                frame: OnceCell::with_value(process_source(source)?),
            });
        };

        let processed_dir = crate::get_data_dir().join("processed");
        std::fs::create_dir_all(&processed_dir)?;
        let parquet_path = processed_dir.join(cache_name);

        if parquet_path.exists() {
            info!(path = ?parquet_path, "OrchidData: Loading existing Parquet file");
            return Ok(Self::from_parquet(parquet_path));
        }

        info!("OrchidData: Generating processed data from raw source");
        let mut df = {
            let _span = info_span!("Transform Raw Data").entered();
            process_source(source)?
        };
        save_to_parquet(&mut df, &parquet_path)?;
        write_metadata(
            &parquet_path,
            &ProcessedMetadata {
                source: describe(source),
                rows: df.height(),
                generated_at: Utc::now(),
            },
        )?;

        Ok(Self {
            parquet_path: Some(parquet_path),
            frame: OnceCell::with_value(df),
        })
    }

    fn from_parquet(path: PathBuf) -> Self {
        Self {
            parquet_path: Some(path),
            frame: OnceCell::new(),
        }
    }

    pub fn parquet_path(&self) -> Option<&Path> {
        self.parquet_path.as_deref()
    }

    pub fn frame(&self) -> Result<&DataFrame> {
        self.frame.get_or_try_init(|| {
            let path = self
                .parquet_path
                .as_deref()
                .ok_or_else(|| DataError::SourceNotFound(PathBuf::new()))?;
            load_parquet(path)
        })
    }

    pub fn into_frame(self) -> Result<DataFrame> {
        self.frame()?;
        Ok(self.frame.into_inner().unwrap_or_default())
    }

    /// Metadata of the cached file, `None` when the source is not cached or the
    /// sidecar is missing.
    pub fn metadata(&self) -> Result<Option<ProcessedMetadata>> {
        let Some(path) = self.parquet_path.as_deref() else {
            return Ok(None);
        };
        let sidecar = path.with_extension("json");
        if !sidecar.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(sidecar)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

fn describe(source: &DataSource) -> String {
    match source {
        DataSource::Remote(url) => url.clone(),
        DataSource::CsvFile(path) => path.display().to_string(),
        DataSource::TestData(config) => format!("test data ({} rows)", config.rows),
    }
}

fn save_to_parquet(df: &mut DataFrame, path: &Path) -> Result<()> {
    let sink_time = std::time::Instant::now();
    // Readers only ever see a complete file
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    ParquetWriter::new(staged.as_file_mut()).finish(df)?;
    staged.persist(path).map_err(|e| e.error)?;
    info!(
        path = ?path.file_stem(),
        sink_time = ?sink_time.elapsed(),
        "Saved to parquet file"
    );
    Ok(())
}

fn write_metadata(parquet_path: &Path, metadata: &ProcessedMetadata) -> Result<()> {
    let content = serde_json::to_string_pretty(metadata)?;
    std::fs::write(parquet_path.with_extension("json"), content)?;
    Ok(())
}

fn load_parquet(path: &Path) -> Result<DataFrame> {
    info!(
        path = ?path.file_stem(),
        "Loading and collecting into memory for the first time..."
    );
    let t_load = std::time::Instant::now();
    let df = LazyFrame::scan_parquet(path, ScanArgsParquet::default())?.collect()?;
    info!(time_collected = ?t_load.elapsed(), rows = df.height(), "Collected into memory");
    Ok(df)
}
