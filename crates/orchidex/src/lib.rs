//! Orchidex - Orchid Catalog Search Library
//!
//! Orchidex loads a catalog of orchid taxa (one record per taxon, a fixed
//! schema of botanical and horticultural attributes) into memory and answers
//! natural-language, full-text, faceted and combined queries over it.
//!
//! # Quick Start
//!
//! ```rust
//! use orchidex::{DataSource, OrchidFilters, OrchidQuery, OrchidSearcher};
//! use orchidex::data_processing::TestDataConfig;
//!
//! let searcher = OrchidSearcher::initialize(DataSource::TestData(TestDataConfig::sample()))?;
//!
//! // Natural language: stop-words dropped, plurals lemmatized, colors and
//! // regions expanded through synonym groups, results ranked
//! let ranked = searcher.smart_search("pink orchids from asia", Some(5))?;
//! for candidate in &ranked {
//!     println!("{} ({})", candidate.scientific_name().unwrap_or("?"), candidate.score);
//! }
//!
//! // Full-text syntax with phrase, boolean and field queries
//! let phrase = searcher.full_text_search("\"slipper orchid\"", None)?;
//!
//! // Structured filters
//! let cool = searcher.search(
//!     &OrchidQuery::Filters(OrchidFilters::new().min_temp(5.0).max_temp(25.0)),
//!     None,
//! )?;
//! # Ok::<(), orchidex::error::OrchidexError>(())
//! ```
//!
//! # Features
//!
//! - **Smart Search**: Normalization, synonym expansion and field-priority ranking
//! - **Full-Text Search**: Tantivy query syntax with a substring fallback on syntax errors
//! - **Faceted Search**: Typed filters on genus, color, region, fragrance, difficulty and temperature
//! - **Batch Processing**: Many natural-language queries in parallel
//!
//! # Data
//!
//! Catalog rows come from a [`DataSource`]: the published orchid dataset
//! (downloaded with the `download_data` feature), a local CSV, or generated
//! test data. Processed rows are cached as Parquet in the data directory.
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod core;
pub mod error;
mod index;
mod predicate;
mod search;
mod store;
pub mod synonyms;
pub mod text;

pub use core::{OrchidSearcher, OrchidSearcherBuilder};

pub use config::{RelevanceBuilder, SearchConfigBuilder};
pub use index::{FTSIndexSearchParams, IndexError, IndexLocation};
pub use orchidex_data_processing as data_processing;
pub use orchidex_data_processing::DataSource;
pub use polars;
pub use predicate::Predicate;
pub use search::{
    BrowsePage, COMBINED_TEXT_FIELDS, Candidate, FALLBACK_SEARCH_FIELDS, OrchidFilters,
    OrchidQuery, RelevanceWeights, SMART_SEARCH_FIELDS, SearchConfig, SearchError,
    SearchResults, score_record,
};
pub use store::{
    CatalogStatistics, FieldValue, OrchidRecord, OrchidStore, SortSpec, StoreError,
};
pub use synonyms::{SynonymDomain, SynonymGroup, SynonymTable};
pub use text::normalize;

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the Orchidex library.
///
/// Installs a `tracing` fmt subscriber filtered by `RUST_LOG` when set, and by
/// `level` otherwise. Repeated calls are no-ops.
///
/// # Examples
///
/// ```rust
/// use orchidex::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), orchidex::error::OrchidexError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::OrchidexError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("tantivy=warn".parse()?)
            .add_directive("hyper_util=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_processing::{TestDataConfig, create_test_frame};

    fn setup_test_env() {
        let _ = init_logging(tracing::Level::WARN);
    }

    fn searcher() -> OrchidSearcher {
        OrchidSearcher::from_frame(create_test_frame(&TestDataConfig::sample()).unwrap()).unwrap()
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        setup_test_env();
        assert!(init_logging(tracing::Level::DEBUG).is_ok());
    }

    #[test]
    fn test_searcher_creation() {
        setup_test_env();
        let searcher = OrchidSearcher::initialize(DataSource::TestData(TestDataConfig::sample()));
        assert!(
            searcher.is_ok(),
            "Should be able to create searcher with test data"
        );
        assert_eq!(searcher.unwrap().len(), 12);
    }

    #[test]
    fn test_basic_search() {
        setup_test_env();
        let searcher = searcher();

        for term in ["vanda", "cattleya", "dendrobium", "masdevallia"] {
            let results = searcher.smart_search(term, None).unwrap();
            assert!(!results.is_empty(), "Smart search for '{term}' should match");
            assert_eq!(results[0].score, 10);
        }
    }

    #[test]
    fn test_batch_search() {
        setup_test_env();
        let searcher = searcher();
        let results = searcher
            .smart_search_batch(&["blue", "yellow", "scarlet"], None)
            .unwrap();
        assert_eq!(results.len(), 3, "Should have results for all 3 queries");
        assert!(results.iter().all(|r| !r.is_empty()));
    }

    #[test]
    fn test_configuration() {
        setup_test_env();
        let config = SearchConfigBuilder::fast().limit(2).build();
        assert_eq!(config.limit, 2);

        let searcher = searcher().with_config(config);
        let results = searcher.smart_search("asia", None).unwrap();
        assert!(results.len() <= 2, "Should respect limit in configuration");
    }

    #[test]
    fn test_empty_search() {
        setup_test_env();
        let searcher = searcher();

        assert!(searcher.smart_search("", None).unwrap().is_empty());
        assert!(searcher.full_text_search("   ", None).unwrap().is_empty());
        assert!(
            searcher
                .smart_search("XYZ123NONEXISTENT", None)
                .unwrap()
                .is_empty()
        );
    }
}
