use anyhow::Result;
use orchidex::data_processing::TestDataConfig;
use orchidex::{DataSource, OrchidFilters, OrchidQuery, OrchidSearcher, SearchConfigBuilder, SortSpec};
use tracing::{Level, info, info_span};

fn main() -> Result<()> {
    orchidex::init_logging(Level::INFO)?;

    // Swap in `DataSource::default()` to download the published catalog
    let config = SearchConfigBuilder::fast().build();
    let searcher = OrchidSearcher::initialize_with_config(
        DataSource::TestData(TestDataConfig::sample()),
        config,
    )?;
    let stats = searcher.statistics()?;
    info!(
        total = stats.total,
        genera = stats.distinct_genus_count,
        colors = stats.distinct_color_count,
        regions = stats.distinct_region_count,
        "Catalog loaded"
    );

    {
        let _span = info_span!("smart_search").entered();
        for candidate in searcher.smart_search("pink fragrant orchids from asia", None)? {
            info!(
                name = candidate.scientific_name().unwrap_or_default(),
                color = candidate.flower_color().unwrap_or_default(),
                score = candidate.score
            );
        }
    }

    {
        let _span = info_span!("full_text_search").entered();
        // The unbalanced quote is rejected by the parser and served by substring search
        for query in ["\"slipper orchid\"", "Native_Regions:philippines", "\"slipper"] {
            let found = searcher.full_text_search(query, None)?;
            info!(query, found = found.len());
        }
    }

    {
        let _span = info_span!("filters").entered();
        let filters = OrchidFilters::from_pairs([
            ("difficulty", "easy"),
            ("min_temp", "15"),
            ("season", "spring"),
        ]);
        let results = searcher.search(&OrchidQuery::Filters(filters), None)?;
        for record in results.records() {
            info!(name = record.scientific_name().unwrap_or_default());
        }

        let cool = OrchidFilters::new().min_temp(10.0).max_temp(25.0);
        let combined = searcher.combined_search(Some("india"), &cool, None)?;
        info!(found = combined.len(), "Cool-growing orchids from India");
    }

    let page = searcher.browse(1, 5, Some(&SortSpec::ascending("Genus")))?;
    info!(
        page = page.page,
        total_pages = page.total_pages,
        genera = ?page.records.iter().filter_map(|r| r.genus()).collect::<Vec<_>>(),
        "First page by genus"
    );

    let batch = searcher.smart_search_batch(&["blue", "yellow", "vanilla"], Some(3))?;
    for (query, results) in ["blue", "yellow", "vanilla"].iter().zip(&batch) {
        info!(query, found = results.len());
    }

    Ok(())
}
