//! In-memory record store.
//!
//! [`OrchidStore`] keeps every record in one polars [`DataFrame`] (the `id`
//! column first, then the fixed schema) and a full-text index over the same
//! rows. Loading appends and rebuilds the index; reads never mutate, so a
//! shared `&OrchidStore` can serve many searches at once.

mod record;

pub use error::StoreError;
use error::Result;
pub use record::{FieldValue, OrchidRecord};

use crate::index::{FTSIndexSearchParams, IndexLocation, OrchidIndex, OrchidIndexDef};
use crate::predicate::Predicate;
use orchidex_data_processing::conform_to_schema;
use orchidex_data_processing::schema::{
    ID_COLUMN, ORCHID_SCHEMA, columns, is_known_column,
};
use polars::prelude::*;
use tracing::{debug, info, instrument};

const SCORE_COLUMN: &str = "_score";

/// Sort order for scans.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortSpec {
    pub column: String,
    pub descending: bool,
}

impl SortSpec {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// Catalog-wide counts. Distinct counts ignore nulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogStatistics {
    pub total: usize,
    pub distinct_genus_count: usize,
    pub distinct_color_count: usize,
    pub distinct_region_count: usize,
}

/// The full column layout of the store frame.
pub fn store_schema() -> Schema {
    Schema::from_iter(
        std::iter::once((PlSmallStr::from_static(ID_COLUMN), DataType::UInt64))
            .chain(ORCHID_SCHEMA.iter().cloned()),
    )
}

#[derive(Debug, Clone)]
pub struct OrchidStore {
    frame: DataFrame,
    index: OrchidIndex,
    location: IndexLocation,
    next_id: u64,
}

impl OrchidStore {
    /// An empty store with the full schema.
    pub fn create_schema(location: IndexLocation) -> Result<Self> {
        let frame = DataFrame::empty_with_schema(&store_schema());
        let index = OrchidIndex::new(OrchidIndexDef, &frame, &location, true)?;
        Ok(Self {
            frame,
            index,
            location,
            next_id: 1,
        })
    }

    /// Open a store over already-conformed rows, reusing an on-disk index when
    /// it is up to date.
    pub fn open(frame: DataFrame, location: IndexLocation) -> Result<Self> {
        let mut store = Self::create_schema(IndexLocation::InMemory)?;
        store.location = location;
        store.append(frame, false)?;
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn index_location(&self) -> &IndexLocation {
        &self.location
    }

    /// Conform `rows` to the schema, assign ids and append them, then rebuild
    /// the full-text index. Returns the number of records added.
    #[instrument(name = "Bulk load", skip_all, fields(rows = rows.height()))]
    pub fn bulk_load(&mut self, rows: DataFrame) -> Result<usize> {
        self.append(rows, true)
    }

    fn append(&mut self, rows: DataFrame, overwrite_index: bool) -> Result<usize> {
        let t_load = std::time::Instant::now();
        let added = rows.height();
        if added == 0 {
            debug!("Nothing to load");
            return Ok(0);
        }

        let offset = IdxSize::try_from(self.next_id).map_err(|_| StoreError::IdOverflow)?;
        let new_rows = conform_to_schema(rows.lazy())?
            .with_row_index(ID_COLUMN, Some(offset))
            .with_column(col(ID_COLUMN).cast(DataType::UInt64));

        let combined = concat(
            [self.frame.clone().lazy(), new_rows],
            UnionArgs::default(),
        )?
        .collect()?;

        let index = OrchidIndex::new(OrchidIndexDef, &combined, &self.location, overwrite_index)?;

        self.frame = combined;
        self.index = index;
        self.next_id += added as u64;
        info!(
            added,
            total = self.frame.height(),
            elapsed = ?t_load.elapsed(),
            "Loaded records"
        );
        Ok(added)
    }

    /// Remove every record and empty the index. Ids restart at 1.
    #[instrument(name = "Clear store", skip_all)]
    pub fn clear_all(&mut self) -> Result<()> {
        let frame = DataFrame::empty_with_schema(&store_schema());
        self.index = OrchidIndex::new(OrchidIndexDef, &frame, &self.location, true)?;
        self.frame = frame;
        self.next_id = 1;
        info!("Store cleared");
        Ok(())
    }

    fn sorted(lf: LazyFrame, sort: Option<&SortSpec>) -> Result<LazyFrame> {
        let Some(sort) = sort else { return Ok(lf) };
        if !is_known_column(&sort.column) {
            return Err(StoreError::UnknownColumn(sort.column.clone()));
        }
        Ok(lf.sort(
            [sort.column.as_str()],
            SortMultipleOptions::default()
                .with_order_descending(sort.descending)
                .with_nulls_last(true)
                .with_maintain_order(true),
        ))
    }

    /// Records satisfying `predicate`, in store order unless sorted, at most `limit`.
    pub fn scan(
        &self,
        predicate: &Predicate,
        limit: usize,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<OrchidRecord>> {
        self.scan_page(predicate, 0, limit, sort)
    }

    /// A window of the matching records.
    pub fn scan_page(
        &self,
        predicate: &Predicate,
        offset: usize,
        len: usize,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<OrchidRecord>> {
        if len == 0 || matches!(predicate, Predicate::Never) {
            return Ok(Vec::new());
        }
        let lf = self.frame.clone().lazy().filter(predicate.to_expr());
        let df = Self::sorted(lf, sort)?
            .slice(offset as i64, IdxSize::try_from(len).unwrap_or(IdxSize::MAX))
            .collect()?;
        Ok(OrchidRecord::from_frame(&df)?)
    }

    /// Number of records satisfying `predicate`.
    pub fn count(&self, predicate: &Predicate) -> Result<usize> {
        match predicate {
            Predicate::Always => Ok(self.len()),
            Predicate::Never => Ok(0),
            _ => Ok(self
                .frame
                .clone()
                .lazy()
                .filter(predicate.to_expr())
                .collect()?
                .height()),
        }
    }

    /// Records satisfying `predicate` paired with `score`, highest score first.
    /// Equal scores keep store order.
    pub fn scan_ranked(
        &self,
        predicate: &Predicate,
        score: Expr,
        limit: usize,
    ) -> Result<Vec<(OrchidRecord, u32)>> {
        if limit == 0 || matches!(predicate, Predicate::Never) {
            return Ok(Vec::new());
        }
        let df = self
            .frame
            .clone()
            .lazy()
            .filter(predicate.to_expr())
            .with_column(score.cast(DataType::UInt32).alias(SCORE_COLUMN))
            .sort(
                [SCORE_COLUMN],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_maintain_order(true),
            )
            .limit(IdxSize::try_from(limit).unwrap_or(IdxSize::MAX))
            .collect()?;

        let scores: Vec<u32> = df
            .column(SCORE_COLUMN)?
            .u32()?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        let records = OrchidRecord::from_frame(&df)?;
        Ok(records.into_iter().zip(scores).collect())
    }

    /// Records matching a raw full-text query, in store order, at most `limit`.
    pub fn full_text_match(
        &self,
        query: &str,
        limit: usize,
        params: &FTSIndexSearchParams,
    ) -> Result<Vec<OrchidRecord>> {
        let ids = self.index.matching_ids(query, params)?;
        if ids.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let mask: BooleanChunked = self
            .frame
            .column(ID_COLUMN)?
            .u64()?
            .into_iter()
            .map(|id| id.is_some_and(|id| ids.contains(&id)))
            .collect();
        let df = self.frame.filter(&mask)?.head(Some(limit));
        Ok(OrchidRecord::from_frame(&df)?)
    }

    /// Distinct non-null values of a column, sorted ascending, as text.
    pub fn distinct_values(&self, column: &str) -> Result<Vec<String>> {
        if !is_known_column(column) {
            return Err(StoreError::UnknownColumn(column.to_string()));
        }
        let df = self
            .frame
            .clone()
            .lazy()
            .select([col(column)
                .drop_nulls()
                .unique()
                .sort(SortOptions::default())
                .cast(DataType::String)])
            .collect()?;
        Ok(df
            .column(column)?
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect())
    }

    fn distinct_count(&self, column: &str) -> Result<usize> {
        Ok(self.frame.column(column)?.drop_nulls().n_unique()?)
    }

    pub fn statistics(&self) -> Result<CatalogStatistics> {
        Ok(CatalogStatistics {
            total: self.len(),
            distinct_genus_count: self.distinct_count(columns::GENUS)?,
            distinct_color_count: self.distinct_count(columns::FLOWER_COLOR)?,
            distinct_region_count: self.distinct_count(columns::NATIVE_REGIONS)?,
        })
    }
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum StoreError {
        #[error("DataFrame error: {0}")]
        DataFrame(#[from] polars::prelude::PolarsError),
        #[error("Index error: {0}")]
        Index(#[from] crate::index::IndexError),
        #[error("Data processing error: {0}")]
        DataProcessing(#[from] orchidex_data_processing::DataError),
        #[error("Unknown column: {0}")]
        UnknownColumn(String),
        #[error("Record id space exhausted")]
        IdOverflow,
    }
    pub type Result<T> = std::result::Result<T, StoreError>;
}
