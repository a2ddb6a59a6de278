//! Query planning: turns each query shape into a predicate (or full-text query)
//! and runs it against the record store.
//!
//! Natural-language text is normalized, synonym-expanded and ranked; full-text
//! syntax goes to the index and falls back to substring search when the syntax
//! is rejected; filters become an AND of typed predicates. All paths return at
//! most `limit` records and treat blank text as "no results".

use itertools::Itertools;
use orchidex_data_processing::columns;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use super::{
    Result, SearchError,
    filters::OrchidFilters,
    results::{BrowsePage, Candidate, OrchidQuery, SearchResults},
    scoring::{RelevanceWeights, score_expr},
};
use crate::{
    SearchConfigBuilder,
    index::{FTSIndexSearchParams, IndexError, IndexLocation},
    predicate::Predicate,
    store::{OrchidRecord, OrchidStore, SortSpec, StoreError},
    synonyms::SynonymTable,
    text::normalize,
};

/// Fields a natural-language token may hit.
pub const SMART_SEARCH_FIELDS: [&str; 15] = [
    columns::SCIENTIFIC_NAME,
    columns::GENUS,
    columns::FLOWER_COLOR,
    columns::COMMON_NAMES,
    columns::NATIVE_REGIONS,
    columns::NATIVE_HABITAT,
    columns::SPECIAL_FEATURES,
    columns::FRAGRANCE,
    columns::FRAGRANCE_DESCRIPTION,
    columns::PETAL_SHAPE,
    columns::LIP_COLOR,
    columns::TEMPERATURE_PREFERENCE,
    columns::BLOOMING_SEASON,
    columns::HORTICULTURAL_NOTES,
    columns::GROWTH_HABIT,
];

/// Fields searched by raw substring when full-text syntax is rejected.
pub const FALLBACK_SEARCH_FIELDS: [&str; 6] = [
    columns::SCIENTIFIC_NAME,
    columns::GENUS,
    columns::FLOWER_COLOR,
    columns::COMMON_NAMES,
    columns::NATIVE_REGIONS,
    columns::SPECIAL_FEATURES,
];

/// Fields the free text of a combined query is matched against.
pub const COMBINED_TEXT_FIELDS: [&str; 7] = [
    columns::SCIENTIFIC_NAME,
    columns::GENUS,
    columns::FLOWER_COLOR,
    columns::COMMON_NAMES,
    columns::NATIVE_REGIONS,
    columns::SPECIAL_FEATURES,
    columns::FRAGRANCE_DESCRIPTION,
];

/// Configuration for search operations.
///
/// Use [`SearchConfigBuilder`] for presets and validated relevance weights.
///
/// ```rust
/// use orchidex::SearchConfig;
///
/// let config = SearchConfig::builder().limit(10).build();
/// assert_eq!(config.limit, 10);
/// ```
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Result cap used when the caller does not pass one
    pub limit: usize,
    /// Field weights for natural-language ranking
    pub relevance: RelevanceWeights,
    /// How raw full-text queries are parsed
    pub full_text: FTSIndexSearchParams,
    /// Where the full-text index lives
    pub index_location: IndexLocation,
    /// Color and region groups used for query expansion
    pub synonyms: SynonymTable,
}

impl SearchConfig {
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: 50,
            relevance: RelevanceWeights::default(),
            full_text: FTSIndexSearchParams::default(),
            index_location: IndexLocation::default(),
            synonyms: SynonymTable::default(),
        }
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Normalized tokens and the predicate built from their expansions.
fn plan_smart_query(text: &str, synonyms: &SynonymTable) -> Option<(Vec<String>, Predicate)> {
    let tokens = normalize(text);
    if tokens.is_empty() {
        return None;
    }
    let expansions: Vec<String> = tokens
        .iter()
        .flat_map(|token| synonyms.expand(token))
        .unique()
        .collect();
    debug!(?tokens, ?expansions, "Planned natural-language query");

    let predicate = Predicate::or(
        SMART_SEARCH_FIELDS
            .iter()
            .map(|column| Predicate::contains_any(*column, expansions.iter().cloned())),
    );
    Some((tokens, predicate))
}

/// Natural-language search ranked by where the first token matches.
#[instrument(name = "Smart search", level = "debug", skip(store, config))]
pub fn smart_search_inner(
    text: &str,
    limit: usize,
    store: &OrchidStore,
    config: &SearchConfig,
) -> Result<Vec<Candidate>> {
    let t_search = std::time::Instant::now();
    let Some((tokens, predicate)) = plan_smart_query(text, &config.synonyms) else {
        debug!("No searchable tokens");
        return Ok(Vec::new());
    };

    let score = score_expr(&tokens[0], &config.relevance);
    let candidates: Vec<Candidate> = store
        .scan_ranked(&predicate, score, limit)?
        .into_iter()
        .map(|(record, score)| Candidate { record, score })
        .collect();

    debug!(
        found = candidates.len(),
        elapsed = ?t_search.elapsed(),
        "Smart search finished"
    );
    Ok(candidates)
}

/// Raw full-text query against the index. Rejected syntax falls back to
/// [`fallback_search_inner`]; every other failure propagates.
#[instrument(name = "Full-text search", level = "debug", skip(store, config))]
pub fn full_text_search_inner(
    text: &str,
    limit: usize,
    store: &OrchidStore,
    config: &SearchConfig,
) -> Result<Vec<OrchidRecord>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    match store.full_text_match(text, limit, &config.full_text) {
        Ok(records) => {
            debug!(found = records.len(), "Full-text search finished");
            Ok(records)
        }
        Err(StoreError::Index(IndexError::QuerySyntax(reason))) => {
            warn!(query = text, %reason, "Full-text syntax rejected, using substring search");
            fallback_search_inner(text, limit, store)
        }
        Err(e) => Err(e.into()),
    }
}

/// Raw text as a substring over the fallback fields, in store order.
#[instrument(name = "Fallback search", level = "debug", skip(store))]
pub fn fallback_search_inner(
    text: &str,
    limit: usize,
    store: &OrchidStore,
) -> Result<Vec<OrchidRecord>> {
    if is_blank(text) {
        return Ok(Vec::new());
    }
    let predicate = Predicate::contains_in_any(&FALLBACK_SEARCH_FIELDS, text);
    Ok(store.scan(&predicate, limit, None)?)
}

/// AND of the present filters. No filters matches everything.
#[instrument(name = "Filter search", level = "debug", skip(store))]
pub fn filter_search_inner(
    filters: &OrchidFilters,
    limit: usize,
    store: &OrchidStore,
) -> Result<Vec<OrchidRecord>> {
    Ok(store.scan(&filters.to_predicate(), limit, None)?)
}

/// Optional free text AND the filters. Text that is present but blank
/// yields nothing.
#[instrument(name = "Combined search", level = "debug", skip(store))]
pub fn combined_search_inner(
    text: Option<&str>,
    filters: &OrchidFilters,
    limit: usize,
    store: &OrchidStore,
) -> Result<Vec<OrchidRecord>> {
    let text_term = match text {
        Some(text) if is_blank(text) => return Ok(Vec::new()),
        Some(text) => Predicate::contains_in_any(&COMBINED_TEXT_FIELDS, text.trim()),
        None => Predicate::Always,
    };
    let predicate = Predicate::and([text_term, filters.to_combined_predicate()]);
    Ok(store.scan(&predicate, limit, None)?)
}

/// Dispatch a query to the matching path.
pub fn search_inner(
    query: &OrchidQuery,
    limit: usize,
    store: &OrchidStore,
    config: &SearchConfig,
) -> Result<SearchResults> {
    let t_search = std::time::Instant::now();
    let results = match query {
        OrchidQuery::NaturalLanguage(text) => {
            SearchResults::Ranked(smart_search_inner(text, limit, store, config)?)
        }
        OrchidQuery::FullText(text) => {
            SearchResults::Records(full_text_search_inner(text, limit, store, config)?)
        }
        OrchidQuery::Filters(filters) => {
            SearchResults::Records(filter_search_inner(filters, limit, store)?)
        }
        OrchidQuery::Combined { text, filters } => SearchResults::Records(
            combined_search_inner(text.as_deref(), filters, limit, store)?,
        ),
    };
    info!(
        found = results.len(),
        elapsed = ?t_search.elapsed(),
        "Search completed"
    );
    Ok(results)
}

/// Several natural-language queries at once, one result list per query in
/// input order.
#[instrument(name = "Smart search batch", skip_all, fields(queries = texts.len()))]
pub fn smart_search_batch_inner<S: AsRef<str> + Sync>(
    texts: &[S],
    limit: usize,
    store: &OrchidStore,
    config: &SearchConfig,
) -> Result<Vec<Vec<Candidate>>> {
    let t_batch = std::time::Instant::now();
    let results = texts
        .par_iter()
        .map(|text| smart_search_inner(text.as_ref(), limit, store, config))
        .collect::<Result<Vec<_>>>()?;
    info!(
        queries = texts.len(),
        elapsed = ?t_batch.elapsed(),
        "Batch search completed"
    );
    Ok(results)
}

/// One page of the catalog. Pages are 1-based; page 0 reads as page 1.
#[instrument(name = "Browse", level = "debug", skip(store))]
pub fn browse_inner(
    page: usize,
    page_size: usize,
    sort: Option<&SortSpec>,
    store: &OrchidStore,
) -> Result<BrowsePage> {
    if page_size == 0 {
        return Err(SearchError::InvalidArgument(
            "page size must be at least 1".to_string(),
        ));
    }
    let page = page.max(1);
    let total = store.len();
    let offset = (page - 1).saturating_mul(page_size);
    let records = store.scan_page(&Predicate::Always, offset, page_size, sort)?;
    Ok(BrowsePage {
        records,
        total,
        page,
        total_pages: total.div_ceil(page_size),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchidex_data_processing::{TestDataConfig, create_test_frame};

    fn store() -> OrchidStore {
        let mut store = OrchidStore::create_schema(IndexLocation::InMemory).unwrap();
        store
            .bulk_load(create_test_frame(&TestDataConfig::sample()).unwrap())
            .unwrap();
        store
    }

    fn names(records: &[OrchidRecord]) -> Vec<&str> {
        records.iter().filter_map(OrchidRecord::scientific_name).collect()
    }

    #[test]
    fn test_plan_smart_query_expands_every_token() {
        let (tokens, predicate) =
            plan_smart_query("Pink orchids from Asia", SynonymTable::builtin()).unwrap();
        assert_eq!(tokens, vec!["pink", "orchid", "asia"]);
        assert_eq!(predicate.columns().len(), SMART_SEARCH_FIELDS.len());
        let Predicate::Or(terms) = predicate else {
            panic!("expected an OR over the smart fields");
        };
        let Predicate::ContainsAny { needles, .. } = &terms[0] else {
            panic!("expected a multi-needle term");
        };
        assert_eq!(needles[0], "pink");
        assert!(needles.iter().any(|n| n == "magenta"));
        assert!(needles.iter().any(|n| n == "thailand"));
        assert!(plan_smart_query("the of and", SynonymTable::builtin()).is_none());
    }

    #[test]
    fn test_smart_search_ranks_by_first_token() {
        let store = store();
        let config = SearchConfig::default();
        let results = smart_search_inner("phalaenopsis", 10, &store, &config).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|c| c.score == 10));
        assert!(results.windows(2).all(|w| w[0].record.id < w[1].record.id));
    }

    #[test]
    fn test_full_text_falls_back_on_bad_syntax() {
        let store = store();
        let config = SearchConfig::default();
        let fts = full_text_search_inner("\"slipper", 10, &store, &config).unwrap();
        let fallback = fallback_search_inner("\"slipper", 10, &store).unwrap();
        assert_eq!(fts, fallback);
    }

    #[test]
    fn test_full_text_trims_before_falling_back() {
        let store = store();
        let config = SearchConfig::default();
        let padded = full_text_search_inner("  \"slipper  ", 10, &store, &config).unwrap();
        assert_eq!(padded, fallback_search_inner("\"slipper", 10, &store).unwrap());
        assert_eq!(names(&padded).len(), 1);

        let padded = full_text_search_inner("\tcattleya \n", 10, &store, &config).unwrap();
        assert_eq!(padded, full_text_search_inner("cattleya", 10, &store, &config).unwrap());
    }

    #[test]
    fn test_full_text_prefix_terms() {
        let store = store();
        let config = SearchConfig::default();
        let vanda = full_text_search_inner("vand*", 10, &store, &config).unwrap();
        assert_eq!(vanda.len(), 1);
        assert_eq!(vanda[0].genus(), Some("Vanda"));

        let phal = full_text_search_inner("phal*", 10, &store, &config).unwrap();
        assert_eq!(phal.len(), 2);
        assert!(phal.iter().all(|r| r.genus() == Some("Phalaenopsis")));
    }

    #[test]
    fn test_combined_blank_text_is_empty() {
        let store = store();
        let filters = OrchidFilters::new();
        assert!(combined_search_inner(Some("  "), &filters, 10, &store).unwrap().is_empty());
        assert_eq!(
            combined_search_inner(None, &filters, 5, &store).unwrap().len(),
            5
        );
    }

    #[test]
    fn test_combined_text_and_filters() {
        let store = store();
        let filters = OrchidFilters::new().native_region("philippines");
        let found = combined_search_inner(Some("phalaenopsis"), &filters, 10, &store).unwrap();
        assert_eq!(
            names(&found),
            vec!["Phalaenopsis amabilis", "Phalaenopsis schilleriana"]
        );
    }

    #[test]
    fn test_browse_pages() {
        let store = store();
        let page = browse_inner(0, 5, None, &store).unwrap();
        assert_eq!((page.page, page.total, page.total_pages), (1, 12, 3));
        assert_eq!(page.records.len(), 5);
        let last = browse_inner(3, 5, None, &store).unwrap();
        assert_eq!(last.records.len(), 2);
        assert!(!last.has_next());
        assert!(browse_inner(9, 5, None, &store).unwrap().records.is_empty());
        assert!(matches!(
            browse_inner(1, 0, None, &store),
            Err(SearchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_batch_preserves_input_order() {
        let store = store();
        let config = SearchConfig::default();
        let batch =
            smart_search_batch_inner(&["vanda", "", "cattleya"], 10, &store, &config).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0][0].record.genus(), Some("Vanda"));
        assert!(batch[1].is_empty());
        assert_eq!(batch[2][0].record.genus(), Some("Cattleya"));
    }
}
