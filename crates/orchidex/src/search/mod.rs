//! Search over the orchid catalog.
//!
//! Four query shapes are supported: natural language (normalized, expanded and
//! ranked), raw full-text syntax with substring fallback, structured filters,
//! and free text combined with filters. The planner in this module turns each
//! into store reads.

pub use error::SearchError;
mod filters;
mod orchestration;
mod results;
mod scoring;

use error::Result;
pub use filters::OrchidFilters;
pub use orchestration::{
    COMBINED_TEXT_FIELDS, FALLBACK_SEARCH_FIELDS, SMART_SEARCH_FIELDS, SearchConfig,
    browse_inner, combined_search_inner, fallback_search_inner, filter_search_inner,
    full_text_search_inner, search_inner, smart_search_batch_inner, smart_search_inner,
};
pub use results::{BrowsePage, Candidate, OrchidQuery, SearchResults};
pub use scoring::{RelevanceWeights, score_record};

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum SearchError {
        #[error("DataFrame error: {0}")]
        DataFrame(#[from] polars::prelude::PolarsError),
        #[error("Store error: {0}")]
        Store(#[from] crate::store::StoreError),
        #[error("Invalid search configuration: {0}")]
        InvalidConfig(String),
        #[error("Invalid argument: {0}")]
        InvalidArgument(String),
        #[error(transparent)]
        Other(#[from] anyhow::Error),
    }
    pub type Result<T> = std::result::Result<T, SearchError>;
}
