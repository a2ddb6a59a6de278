//! The [`OrchidSearcher`] facade over the record store and query planner.
//!
//! # Quick Start
//!
//! ```rust
//! use orchidex::{DataSource, OrchidFilters, OrchidSearcher};
//! use orchidex::data_processing::TestDataConfig;
//!
//! let searcher = OrchidSearcher::initialize(DataSource::TestData(TestDataConfig::sample()))?;
//!
//! // Ranked natural-language search
//! let ranked = searcher.smart_search("blue orchids from india", None)?;
//!
//! // Structured filters
//! let easy = searcher.filter_search(&OrchidFilters::new().difficulty("easy"), None)?;
//! # Ok::<(), orchidex::error::OrchidexError>(())
//! ```
//!
//! # Search Types
//!
//! - **Smart search**: free text, normalized and synonym-expanded, ranked by relevance
//! - **Full-text search**: raw query syntax, substring fallback on syntax errors
//! - **Filter search**: typed constraints on genus, color, region, fragrance, difficulty, temperature
//! - **Combined search**: free text AND filters

use std::path::Path;

pub use orchidex_data_processing::DataSource;
use orchidex_data_processing::{OrchidData, read_orchid_csv};
use polars::prelude::*;
use tracing::{info, instrument};

use crate::{
    error::OrchidexError,
    search::{
        BrowsePage, Candidate, OrchidFilters, OrchidQuery, SearchConfig, SearchResults,
        browse_inner, combined_search_inner, fallback_search_inner, filter_search_inner,
        full_text_search_inner, search_inner, smart_search_batch_inner, smart_search_inner,
    },
    store::{CatalogStatistics, OrchidRecord, OrchidStore, SortSpec},
};

/// Owns the catalog and answers every kind of query against it.
///
/// Searches take `&self`, so one searcher can be shared across threads.
/// Loading and [`reset`](Self::reset) need `&mut self`.
///
/// # Examples
///
/// ```rust
/// use orchidex::{OrchidSearcher, SearchConfig};
/// use orchidex::data_processing::{TestDataConfig, create_test_frame};
///
/// let frame = create_test_frame(&TestDataConfig::sample())?;
/// let searcher = OrchidSearcher::from_frame(frame)?
///     .with_config(SearchConfig::builder().limit(5).build());
///
/// let results = searcher.full_text_search("vanda OR cattleya", None)?;
/// assert_eq!(results.len(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct OrchidSearcher {
    store: OrchidStore,
    config: SearchConfig,
}

impl OrchidSearcher {
    /// Load a data source (through the processed-data cache when the source
    /// can be cached) and index it.
    #[instrument(name = "Initialize OrchidSearcher", level = "info")]
    pub fn initialize(data_source: DataSource) -> Result<Self, OrchidexError> {
        Self::initialize_with_config(data_source, SearchConfig::default())
    }

    /// [`initialize`](Self::initialize) with an explicit configuration, which
    /// also decides where the full-text index lives.
    #[instrument(name = "Initialize OrchidSearcher with config", level = "info", skip(config))]
    pub fn initialize_with_config(
        data_source: DataSource,
        config: SearchConfig,
    ) -> Result<Self, OrchidexError> {
        let t_init = std::time::Instant::now();
        let frame = OrchidData::new(&data_source)?.into_frame()?;
        let store = OrchidStore::open(frame, config.index_location.clone())?;
        info!(
            records = store.len(),
            elapsed_seconds = ?t_init.elapsed(),
            "OrchidSearcher initialization complete"
        );
        Ok(Self { store, config })
    }

    /// Read a catalog CSV directly, without caching.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, OrchidexError> {
        let frame = read_orchid_csv(path)?.collect()?;
        Self::from_frame(frame)
    }

    /// Index rows that are already in memory. Columns are conformed to the
    /// schema on the way in.
    pub fn from_frame(frame: DataFrame) -> Result<Self, OrchidexError> {
        let config = SearchConfig::default();
        let store = OrchidStore::open(frame, config.index_location.clone())?;
        Ok(Self { store, config })
    }

    /// A searcher with no records.
    pub fn empty() -> Result<Self, OrchidexError> {
        let config = SearchConfig::default();
        let store = OrchidStore::create_schema(config.index_location.clone())?;
        Ok(Self { store, config })
    }

    /// Replace the search configuration. The index location only takes effect
    /// for searchers built through [`initialize_with_config`](Self::initialize_with_config).
    #[must_use]
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn store(&self) -> &OrchidStore {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn limit(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.config.limit)
    }

    // === Searches ===

    /// Natural-language search, ranked. `limit` defaults to the configured one.
    pub fn smart_search(
        &self,
        text: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Candidate>, OrchidexError> {
        smart_search_inner(text, self.limit(limit), &self.store, &self.config).map_err(From::from)
    }

    /// Raw full-text syntax, falling back to substring search when the syntax
    /// is rejected.
    pub fn full_text_search(
        &self,
        text: &str,
        limit: Option<usize>,
    ) -> Result<Vec<OrchidRecord>, OrchidexError> {
        full_text_search_inner(text, self.limit(limit), &self.store, &self.config)
            .map_err(From::from)
    }

    /// Case-insensitive substring search over names, color, regions and features.
    pub fn fallback_search(
        &self,
        text: &str,
        limit: Option<usize>,
    ) -> Result<Vec<OrchidRecord>, OrchidexError> {
        fallback_search_inner(text, self.limit(limit), &self.store).map_err(From::from)
    }

    pub fn filter_search(
        &self,
        filters: &OrchidFilters,
        limit: Option<usize>,
    ) -> Result<Vec<OrchidRecord>, OrchidexError> {
        filter_search_inner(filters, self.limit(limit), &self.store).map_err(From::from)
    }

    pub fn combined_search(
        &self,
        text: Option<&str>,
        filters: &OrchidFilters,
        limit: Option<usize>,
    ) -> Result<Vec<OrchidRecord>, OrchidexError> {
        combined_search_inner(text, filters, self.limit(limit), &self.store).map_err(From::from)
    }

    /// Run any [`OrchidQuery`].
    pub fn search(
        &self,
        query: &OrchidQuery,
        limit: Option<usize>,
    ) -> Result<SearchResults, OrchidexError> {
        search_inner(query, self.limit(limit), &self.store, &self.config).map_err(From::from)
    }

    /// Several natural-language queries in parallel, results in input order.
    pub fn smart_search_batch<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
        limit: Option<usize>,
    ) -> Result<Vec<Vec<Candidate>>, OrchidexError> {
        smart_search_batch_inner(texts, self.limit(limit), &self.store, &self.config)
            .map_err(From::from)
    }

    // === Catalog ===

    /// One page of the whole catalog, optionally sorted. Pages start at 1.
    pub fn browse(
        &self,
        page: usize,
        page_size: usize,
        sort: Option<&SortSpec>,
    ) -> Result<BrowsePage, OrchidexError> {
        browse_inner(page, page_size, sort, &self.store).map_err(From::from)
    }

    pub fn statistics(&self) -> Result<CatalogStatistics, OrchidexError> {
        self.store.statistics().map_err(From::from)
    }

    /// Distinct non-null values of a column, sorted.
    pub fn unique_values(&self, column: &str) -> Result<Vec<String>, OrchidexError> {
        self.store.distinct_values(column).map_err(From::from)
    }

    // === Loading ===

    /// Append rows and re-index. Returns the number of records added.
    pub fn load_rows(&mut self, rows: DataFrame) -> Result<usize, OrchidexError> {
        self.store.bulk_load(rows).map_err(From::from)
    }

    /// Append every row of a data source.
    #[instrument(name = "Load source", level = "info", skip(self))]
    pub fn load_source(&mut self, data_source: &DataSource) -> Result<usize, OrchidexError> {
        let frame = OrchidData::new(data_source)?.into_frame()?;
        self.load_rows(frame)
    }

    /// Drop every record. Ids restart at 1 on the next load.
    pub fn reset(&mut self) -> Result<(), OrchidexError> {
        self.store.clear_all().map_err(From::from)
    }
}

/// Builder for creating an [`OrchidSearcher`] from a data source.
#[derive(Debug, Clone, Default)]
pub struct OrchidSearcherBuilder {
    data_source: Option<DataSource>,
    config: SearchConfig,
}

impl OrchidSearcherBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data source. Defaults to the published dataset.
    #[must_use]
    pub fn data_source(mut self, source: DataSource) -> Self {
        self.data_source = Some(source);
        self
    }

    #[must_use]
    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<OrchidSearcher, OrchidexError> {
        OrchidSearcher::initialize_with_config(self.data_source.unwrap_or_default(), self.config)
    }
}
