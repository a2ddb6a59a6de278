use once_cell::sync::Lazy;
use std::path::PathBuf;
use tracing::warn;

mod error;
pub mod processed;
pub mod raw;
pub mod schema;
pub mod test_data;

static TEST_DATA_DIR: Lazy<tempfile::TempDir> = Lazy::new(|| {
    tempfile::TempDir::new().expect("Failed to create global temporary test data directory")
});

pub const DATA_DIR_DEFAULT: &str = "./orchidex_data";

/// Centralized function to determine if we should use test data.
pub fn should_use_test_data() -> bool {
    let is_test_environment = cfg!(test) || cfg!(doctest);

    #[cfg(feature = "test_data")]
    let explicit_test_data = std::env::var("USE_TEST_DATA")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    #[cfg(not(feature = "test_data"))]
    let explicit_test_data = false;

    is_test_environment || explicit_test_data
}

/// Get the appropriate test data config based on environment.
pub fn get_test_data_config() -> test_data::TestDataConfig {
    if cfg!(doctest) {
        test_data::TestDataConfig::minimal()
    } else {
        match std::env::var("TEST_DATA_SIZE").as_deref() {
            Ok("sample") => test_data::TestDataConfig::sample(),
            _ => test_data::TestDataConfig::minimal(),
        }
    }
}

/// Global data directory path that automatically determines the appropriate location.
pub static DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    if should_use_test_data() {
        let temp_dir = TEST_DATA_DIR.path().to_path_buf();
        warn!(temp_dir = ?temp_dir, "Using temporary data directory for tests");
        temp_dir
    } else if let Ok(dir) = std::env::var("DATA_DIR") {
        PathBuf::from(dir)
    } else {
        default_data_dir()
    }
});

#[cfg(feature = "system-dirs")]
fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "orchidex").map_or_else(
        || PathBuf::from(DATA_DIR_DEFAULT),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

#[cfg(not(feature = "system-dirs"))]
fn default_data_dir() -> PathBuf {
    PathBuf::from(DATA_DIR_DEFAULT)
}

pub fn get_data_dir() -> &'static std::path::Path {
    DATA_DIR.as_path()
}

pub use error::{DataError, Result};

pub use processed::{OrchidData, conform_to_schema};
pub use raw::{DEFAULT_DATASET_URL, DataSource, read_orchid_csv};
pub use schema::{FULL_TEXT_COLUMNS, ID_COLUMN, ORCHID_SCHEMA, columns, orchid_schema};
pub use test_data::{TestDataConfig, create_test_data, create_test_frame};

#[cfg(test)]
pub(crate) mod tests_utils {
    use polars::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    pub fn assert_has_columns(df: &DataFrame, expected_columns: &[&str]) {
        let actual_columns: Vec<_> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        for expected_col in expected_columns {
            assert!(
                actual_columns.contains(expected_col),
                "Missing column: {}. Available columns: {:?}",
                expected_col,
                actual_columns
            );
        }
    }

    pub fn assert_column_type(df: &DataFrame, column: &str, expected_type: &DataType) {
        let actual_type = df
            .column(column)
            .unwrap_or_else(|_| panic!("Column '{}' not found", column))
            .dtype();
        assert_eq!(
            actual_type, expected_type,
            "Column '{}' has wrong type. Expected: {:?}, Got: {:?}",
            column, expected_type, actual_type
        );
    }

    /// A small hand-written export: renamed `Order` header, a column outside the
    /// schema, padded values and an unparseable temperature.
    pub fn create_messy_csv_file() -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(
            file,
            "Scientific_Name,Genus,Order,Flower_Color,Temperature_Min_C,Humidity_Min_Percent,Photo_URL"
        )
        .unwrap();
        writeln!(
            file,
            "  Vanda coerulea ,Vanda,Asparagales,Blue,10.5,60,http://example.org/vanda.jpg"
        )
        .unwrap();
        writeln!(file, "Cattleya labiata,Cattleya,,Lavender,warm,,").unwrap();
        file.flush().unwrap();
        file
    }
}
