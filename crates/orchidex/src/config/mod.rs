use std::path::PathBuf;

use crate::{
    error::OrchidexError,
    index::IndexLocation,
    search::{RelevanceWeights, SearchConfig},
    synonyms::SynonymTable,
};

/// Builder for creating search configurations with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Create a new builder with sensible defaults
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    /// Create a builder for quick lookups (few results)
    pub fn fast() -> Self {
        let mut builder = Self::new();
        builder.config.limit = 10;
        builder
    }

    /// Create a builder for exploratory searches: more results, and full-text
    /// terms are OR-combined unless the query says otherwise
    pub fn comprehensive() -> Self {
        let mut builder = Self::new();
        builder.config.limit = 200;
        builder.config.full_text.conjunction_by_default = false;
        builder
    }

    /// Set the maximum number of results to return
    pub fn limit(mut self, limit: usize) -> Self {
        self.config.limit = limit;
        self
    }

    /// Require every bare full-text term to match (the default)
    pub fn match_all_terms(mut self) -> Self {
        self.config.full_text.conjunction_by_default = true;
        self
    }

    /// Accept records matching any bare full-text term
    pub fn match_any_term(mut self) -> Self {
        self.config.full_text.conjunction_by_default = false;
        self
    }

    /// Choose where the full-text index lives
    pub fn index_location(mut self, location: IndexLocation) -> Self {
        self.config.index_location = location;
        self
    }

    /// Keep the full-text index in a directory so it can be reused across runs
    pub fn index_dir(self, dir: impl Into<PathBuf>) -> Self {
        self.index_location(IndexLocation::Directory(dir.into()))
    }

    /// Replace the synonym groups used for query expansion
    pub fn synonyms(mut self, table: SynonymTable) -> Self {
        self.config.synonyms = table;
        self
    }

    /// Configure natural-language relevance weights
    pub fn relevance(self) -> RelevanceBuilder {
        RelevanceBuilder::new(self)
    }

    /// Build the final configuration
    pub fn build(self) -> SearchConfig {
        self.config
    }
}

/// Builder for natural-language relevance weights
pub struct RelevanceBuilder {
    parent: SearchConfigBuilder,
}

impl RelevanceBuilder {
    fn new(parent: SearchConfigBuilder) -> Self {
        Self { parent }
    }

    /// Restore the default weights
    pub fn defaults(mut self) -> Self {
        self.parent.config.relevance = RelevanceWeights::default();
        self
    }

    /// Set custom weights, in priority order. They must be positive and
    /// strictly descending.
    pub fn custom_weights(
        mut self,
        scientific_name: u32,
        genus: u32,
        common_names: u32,
        flower_color: u32,
        fallback: u32,
    ) -> Result<Self, OrchidexError> {
        let weights = RelevanceWeights {
            scientific_name,
            genus,
            common_names,
            flower_color,
            fallback,
        };
        weights
            .validate()
            .map_err(|e| OrchidexError::ConfigError(e.to_string()))?;

        self.parent.config.relevance = weights;
        Ok(self)
    }

    /// Return to the main configuration builder
    pub fn done(self) -> SearchConfigBuilder {
        self.parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder() {
        let config = SearchConfigBuilder::new().build();
        assert_eq!(config.limit, 50);
        assert!(config.full_text.conjunction_by_default);
        assert_eq!(config.index_location, IndexLocation::InMemory);
    }

    #[test]
    fn test_fast_preset() {
        let config = SearchConfigBuilder::fast().build();
        assert_eq!(config.limit, 10);
    }

    #[test]
    fn test_comprehensive_preset() {
        let config = SearchConfigBuilder::comprehensive().build();
        assert_eq!(config.limit, 200);
        assert!(!config.full_text.conjunction_by_default);
    }

    #[test]
    fn test_method_chaining() {
        let config = SearchConfigBuilder::new()
            .limit(30)
            .match_any_term()
            .index_dir("/tmp/orchid_index")
            .relevance()
            .custom_weights(20, 15, 10, 5, 2)
            .unwrap()
            .done()
            .build();

        assert_eq!(config.limit, 30);
        assert!(!config.full_text.conjunction_by_default);
        assert_eq!(
            config.index_location,
            IndexLocation::Directory(PathBuf::from("/tmp/orchid_index"))
        );
        assert_eq!(config.relevance.scientific_name, 20);
        assert_eq!(config.relevance.fallback, 2);
    }

    #[test]
    fn test_custom_weights_validation() {
        let result = SearchConfigBuilder::new()
            .relevance()
            .custom_weights(10, 8, 7, 6, 1);
        assert!(result.is_ok());

        // Genus outranking the scientific name breaks the priority order
        let result = SearchConfigBuilder::new()
            .relevance()
            .custom_weights(8, 10, 7, 6, 1);
        assert!(matches!(result, Err(OrchidexError::ConfigError(_))));

        let result = SearchConfigBuilder::new()
            .relevance()
            .custom_weights(4, 3, 2, 1, 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_override_presets() {
        let config = SearchConfigBuilder::comprehensive()
            .limit(25)
            .match_all_terms()
            .build();
        assert_eq!(config.limit, 25);
        assert!(config.full_text.conjunction_by_default);
    }

    #[test]
    fn test_relevance_defaults_restore() {
        let config = SearchConfigBuilder::new()
            .relevance()
            .custom_weights(50, 40, 30, 20, 10)
            .unwrap()
            .defaults()
            .done()
            .build();
        assert_eq!(config.relevance, RelevanceWeights::default());
    }

    #[test]
    fn test_custom_synonyms() {
        use crate::synonyms::SynonymGroup;

        let table = SynonymTable::new([SynonymGroup::color("blue", &["blue", "sky"])]);
        let config = SearchConfigBuilder::new().synonyms(table.clone()).build();
        assert_eq!(config.synonyms, table);
        assert_eq!(config.synonyms.expand("sky"), vec!["sky", "blue"]);
    }
}
