//! Integration tests for Orchidex catalog search
//!
//! These tests run against the full public API over the deterministic sample
//! catalog from the data-processing crate.

use orchidex::data_processing::{TestDataConfig, columns, create_test_data, create_test_frame};
use orchidex::polars::prelude::*;
use orchidex::{
    DataSource, IndexLocation, OrchidFilters, OrchidQuery, OrchidRecord, OrchidSearcher,
    Predicate, SMART_SEARCH_FIELDS, SearchConfigBuilder, SearchResults, SortSpec, score_record,
    synonyms,
};

fn setup_test_env() {
    let _ = orchidex::init_logging(tracing::Level::WARN);
}

fn searcher() -> OrchidSearcher {
    setup_test_env();
    OrchidSearcher::from_frame(create_test_frame(&TestDataConfig::sample()).unwrap())
        .expect("Should create searcher")
}

fn names(records: &[OrchidRecord]) -> Vec<&str> {
    records
        .iter()
        .filter_map(|r| r.text(columns::GENUS))
        .collect()
}

#[test]
fn test_vanda_ranking_scenario() {
    setup_test_env();
    let rows = df! {
        "Scientific_Name" => ["Vanda sanderiana", "Ascocenda Princess Mikasa", "Cattleya walkeriana"],
        "Genus" => ["Euanthe", "Vanda hybrid", "Cattleya"],
        "Flower_Color" => ["Pink", "Blue", "Lavender"],
    }
    .unwrap();
    let searcher = OrchidSearcher::from_frame(rows).unwrap();

    let results = searcher.smart_search("vanda", Some(5)).unwrap();
    let ranked: Vec<_> = results
        .iter()
        .map(|c| (c.scientific_name().unwrap(), c.score))
        .collect();
    assert_eq!(
        ranked,
        vec![
            ("Vanda sanderiana", 10),
            ("Ascocenda Princess Mikasa", 8),
        ]
    );
}

#[test]
fn test_smart_search_respects_limit_and_predicate() {
    let searcher = searcher();
    let query = "pink fragrant orchids from asia";
    let tokens = orchidex::normalize(query);
    assert_eq!(tokens, vec!["pink", "fragrant", "orchid", "asia"]);

    let expansions: Vec<String> = tokens.iter().flat_map(|t| synonyms::expand(t)).collect();
    let qualifies = Predicate::or(
        SMART_SEARCH_FIELDS
            .iter()
            .map(|f| Predicate::contains_any(*f, expansions.iter().cloned())),
    );

    for limit in [1, 3, 50] {
        let results = searcher.smart_search(query, Some(limit)).unwrap();
        assert!(!results.is_empty());
        assert!(results.len() <= limit);
        assert!(results.iter().all(|c| qualifies.matches(&c.record)));
        assert!(results.iter().all(|c| {
            c.score == score_record(&c.record, &tokens[0], &searcher.config().relevance)
        }));
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    // "pink" is the first token: pink flowers outrank region-only matches
    let results = searcher.smart_search(query, None).unwrap();
    assert_eq!(results[0].score, 6);
    assert!(
        results[0]
            .flower_color()
            .unwrap()
            .to_lowercase()
            .contains("pink")
    );
}

#[test]
fn test_rose_expands_to_pink_group() {
    let expanded = synonyms::expand("rose");
    for term in ["pink", "rose", "magenta", "fuchsia"] {
        assert!(expanded.iter().any(|t| t == term), "missing {term}");
    }
    assert_eq!(expanded[0], "rose");
}

#[test]
fn test_blank_input_is_empty_everywhere() {
    let searcher = searcher();
    for blank in ["", "   ", "\t\n"] {
        assert!(searcher.smart_search(blank, None).unwrap().is_empty());
        assert!(searcher.full_text_search(blank, None).unwrap().is_empty());
        assert!(searcher.fallback_search(blank, None).unwrap().is_empty());
        assert!(
            searcher
                .combined_search(Some(blank), &OrchidFilters::new(), None)
                .unwrap()
                .is_empty()
        );
    }
    // Only stop-words and punctuation normalize to nothing
    assert!(searcher.smart_search("the of, and!", None).unwrap().is_empty());
}

#[test]
fn test_malformed_full_text_equals_fallback() {
    let searcher = searcher();
    let query = "\"slipper";
    let full_text = searcher.full_text_search(query, None).unwrap();
    let fallback = searcher.fallback_search(query, None).unwrap();
    assert_eq!(full_text, fallback);
    assert_eq!(names(&full_text), vec!["Paphiopedilum"]);

    let unknown_field = searcher.full_text_search("Photo:vanda", None).unwrap();
    assert_eq!(
        unknown_field,
        searcher.fallback_search("Photo:vanda", None).unwrap()
    );
}

#[test]
fn test_full_text_syntax() {
    let searcher = searcher();
    let found = searcher
        .full_text_search("Native_Regions:philippines", None)
        .unwrap();
    assert_eq!(names(&found), vec!["Phalaenopsis", "Phalaenopsis"]);

    let found = searcher.full_text_search("vanda OR cattleya", None).unwrap();
    assert_eq!(names(&found), vec!["Vanda", "Cattleya"]);

    let found = searcher.full_text_search("\"slipper orchid\"", None).unwrap();
    assert_eq!(names(&found), vec!["Paphiopedilum"]);

    assert_eq!(
        searcher.full_text_search("orchid", Some(2)).unwrap().len(),
        2
    );
}

#[test]
fn test_full_text_prefix_terms() {
    let searcher = searcher();
    assert_eq!(names(&searcher.full_text_search("vand*", None).unwrap()), vec!["Vanda"]);
    assert_eq!(
        names(&searcher.full_text_search("phal*", None).unwrap()),
        vec!["Phalaenopsis", "Phalaenopsis"]
    );
    assert_eq!(
        names(&searcher.full_text_search("Genus:phal* AND pink", None).unwrap()),
        vec!["Phalaenopsis"]
    );
}

#[test]
fn test_dangling_operator_falls_back_to_substring() {
    let searcher = searcher();
    for query in ["pink AND", "  OR vanda  "] {
        assert_eq!(
            searcher.full_text_search(query, None).unwrap(),
            searcher.fallback_search(query.trim(), None).unwrap(),
            "{query}"
        );
    }
}

#[test]
fn test_genus_filter() {
    let searcher = searcher();
    let filters = OrchidFilters::new().genus("phalaenopsis");
    let found = searcher.filter_search(&filters, None).unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|r| r.genus() == Some("Phalaenopsis")));

    let easy = searcher
        .filter_search(&OrchidFilters::new().difficulty("EASY"), None)
        .unwrap();
    assert_eq!(easy.len(), 4);

    let all = searcher.filter_search(&OrchidFilters::new(), Some(5)).unwrap();
    assert_eq!(all.len(), 5);
}

#[test]
fn test_temperature_range_combined_query() {
    let searcher = searcher();
    let filters = OrchidFilters::new().min_temp(10.0).max_temp(25.0);

    let found = searcher.combined_search(None, &filters, None).unwrap();
    assert_eq!(names(&found), vec!["Paphiopedilum", "Miltoniopsis"]);
    for record in &found {
        assert!(record.number(columns::TEMPERATURE_MIN_C).unwrap() >= 10.0);
        assert!(record.number(columns::TEMPERATURE_MAX_C).unwrap() <= 25.0);
    }

    let found = searcher.combined_search(Some("india"), &filters, None).unwrap();
    assert_eq!(names(&found), vec!["Paphiopedilum"]);
}

#[test]
fn test_query_dispatch() {
    let searcher = searcher();
    let ranked = searcher
        .search(&OrchidQuery::NaturalLanguage("blue".into()), None)
        .unwrap();
    assert!(ranked.is_ranked());

    let filters = OrchidFilters::from_pairs([("native_region", "mexico"), ("colour", "red")]);
    let records = searcher
        .search(&OrchidQuery::Filters(filters.clone()), None)
        .unwrap();
    assert!(matches!(records, SearchResults::Records(_)));
    assert_eq!(
        records.into_records(),
        searcher.filter_search(&filters, None).unwrap()
    );

    let combined = searcher
        .search(
            &OrchidQuery::Combined {
                text: Some("vanilla".into()),
                filters,
            },
            None,
        )
        .unwrap();
    assert_eq!(combined.len(), 1);
}

#[test]
fn test_statistics_and_unique_values() {
    let searcher = searcher();
    let stats = searcher.statistics().unwrap();
    assert_eq!(stats.total, 12);
    assert_eq!(stats.distinct_genus_count, 11);
    assert_eq!(stats.distinct_color_count, 12);
    assert_eq!(stats.distinct_region_count, 12);

    let difficulties = searcher
        .unique_values(columns::HORTICULTURAL_DIFFICULTY)
        .unwrap();
    assert_eq!(difficulties, vec!["Difficult", "Easy", "Moderate"]);
}

#[test]
fn test_browse_sorted_pages() {
    let searcher = searcher();
    let sort = SortSpec::descending(columns::TEMPERATURE_MAX_C);
    let page = searcher.browse(1, 5, Some(&sort)).unwrap();
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.records[0].genus(), Some("Vanilla"));
    assert!(page.has_next());

    let collected: usize = (1..=page.total_pages)
        .map(|p| searcher.browse(p, 5, Some(&sort)).unwrap().records.len())
        .sum();
    assert_eq!(collected, 12);
}

#[test]
fn test_reset_and_load_source() {
    setup_test_env();
    let file = create_test_data(&TestDataConfig::minimal()).unwrap();
    let mut searcher = OrchidSearcher::empty().unwrap();

    let added = searcher
        .load_source(&DataSource::CsvFile(file.path().to_path_buf()))
        .unwrap();
    assert_eq!(added, 3);
    assert_eq!(searcher.smart_search("vanda", None).unwrap().len(), 1);

    searcher.reset().unwrap();
    assert!(searcher.is_empty());
    assert!(searcher.filter_search(&OrchidFilters::new(), None).unwrap().is_empty());
}

#[test]
fn test_directory_index_survives_reopen() {
    setup_test_env();
    let dir = tempfile::tempdir().unwrap();
    let config = SearchConfigBuilder::new().index_dir(dir.path()).build();
    assert_eq!(
        config.index_location,
        IndexLocation::Directory(dir.path().to_path_buf())
    );
    let source = DataSource::TestData(TestDataConfig::sample());

    let first = OrchidSearcher::initialize_with_config(source.clone(), config.clone()).unwrap();
    let expected = first.full_text_search("cattleya", None).unwrap();
    drop(first);

    let second = OrchidSearcher::initialize_with_config(source, config).unwrap();
    assert_eq!(second.full_text_search("cattleya", None).unwrap(), expected);
    assert_eq!(expected.len(), 1);
}
