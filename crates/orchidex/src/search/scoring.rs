//! Relevance scoring for natural-language search.
//!
//! A record scores by the highest-priority field containing the query's first
//! normalized token: scientific name, then genus, common names, flower color.
//! Anything else that qualified scores the fallback weight.

use orchidex_data_processing::columns;
use polars::prelude::*;

use super::error::{Result, SearchError};
use crate::predicate::Predicate;
use crate::store::OrchidRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelevanceWeights {
    pub scientific_name: u32,
    pub genus: u32,
    pub common_names: u32,
    pub flower_color: u32,
    pub fallback: u32,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            scientific_name: 10,
            genus: 8,
            common_names: 7,
            flower_color: 6,
            fallback: 1,
        }
    }
}

impl RelevanceWeights {
    /// Weights must be positive and strictly descending in priority order.
    pub fn validate(&self) -> Result<()> {
        let ordered = self.ordered();
        if ordered.iter().any(|(_, weight)| *weight == 0) {
            return Err(SearchError::InvalidConfig(
                "relevance weights must be positive".to_string(),
            ));
        }
        if ordered.windows(2).any(|pair| pair[0].1 <= pair[1].1) {
            return Err(SearchError::InvalidConfig(format!(
                "relevance weights must strictly descend, got {ordered:?}"
            )));
        }
        Ok(())
    }

    fn ordered(&self) -> [(&'static str, u32); 5] {
        [
            (columns::SCIENTIFIC_NAME, self.scientific_name),
            (columns::GENUS, self.genus),
            (columns::COMMON_NAMES, self.common_names),
            (columns::FLOWER_COLOR, self.flower_color),
            ("fallback", self.fallback),
        ]
    }

    fn field_weights(&self) -> [(&'static str, u32); 4] {
        let [a, b, c, d, _] = self.ordered();
        [a, b, c, d]
    }
}

/// Score one record against the first query token.
pub fn score_record(record: &OrchidRecord, first_token: &str, weights: &RelevanceWeights) -> u32 {
    weights
        .field_weights()
        .into_iter()
        .find(|(column, _)| Predicate::contains(*column, first_token).matches(record))
        .map_or(weights.fallback, |(_, weight)| weight)
}

/// The same scoring as a column expression evaluated by the store.
pub fn score_expr(first_token: &str, weights: &RelevanceWeights) -> Expr {
    let [
        (sci_col, sci_w),
        (genus_col, genus_w),
        (common_col, common_w),
        (color_col, color_w),
    ] = weights.field_weights();
    let hit = |column: &'static str| Predicate::contains(column, first_token).to_expr();

    when(hit(sci_col))
        .then(lit(sci_w))
        .when(hit(genus_col))
        .then(lit(genus_w))
        .when(hit(common_col))
        .then(lit(common_w))
        .when(hit(color_col))
        .then(lit(color_w))
        .otherwise(lit(weights.fallback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FieldValue;

    fn record(scientific: &str, genus: &str, common: &str, color: &str) -> OrchidRecord {
        OrchidRecord::from_values(
            1,
            [
                (columns::SCIENTIFIC_NAME, FieldValue::Text(scientific.into())),
                (columns::GENUS, FieldValue::Text(genus.into())),
                (columns::COMMON_NAMES, FieldValue::Text(common.into())),
                (columns::FLOWER_COLOR, FieldValue::Text(color.into())),
            ],
        )
    }

    #[test]
    fn test_priority_order() {
        let w = RelevanceWeights::default();
        assert_eq!(score_record(&record("Vanda x", "Vanda", "", ""), "vanda", &w), 10);
        assert_eq!(score_record(&record("Ascocenda", "Vanda", "", ""), "vanda", &w), 8);
        assert_eq!(score_record(&record("X", "Y", "blue vanda", "vanda"), "vanda", &w), 7);
        assert_eq!(score_record(&record("X", "Y", "", "vanda blue"), "vanda", &w), 6);
        assert_eq!(score_record(&record("X", "Y", "", ""), "vanda", &w), 1);
    }

    #[test]
    fn test_expression_agrees_with_record_scoring() {
        let df = df! {
            columns::SCIENTIFIC_NAME => [Some("Vanda x"), Some("Ascocenda"), Some("X"), None],
            columns::GENUS => [Some("Vanda"), Some("Vanda"), Some("Y"), None],
            columns::COMMON_NAMES => [None, None, Some("blue vanda"), None],
            columns::FLOWER_COLOR => [None::<&str>, None, None, None],
        }
        .unwrap();
        let scores = df
            .lazy()
            .select([score_expr("VANDA", &RelevanceWeights::default()).alias("score")])
            .collect()
            .unwrap();
        let scores: Vec<Option<u32>> = scores.column("score").unwrap().u32().unwrap().into_iter().collect();
        assert_eq!(scores, vec![Some(10), Some(8), Some(7), Some(1)]);
    }

    #[test]
    fn test_validation() {
        assert!(RelevanceWeights::default().validate().is_ok());
        let flat = RelevanceWeights {
            genus: 10,
            ..RelevanceWeights::default()
        };
        assert!(flat.validate().is_err());
        let zero = RelevanceWeights {
            scientific_name: 4,
            genus: 3,
            common_names: 2,
            flower_color: 1,
            fallback: 0,
        };
        assert!(zero.validate().is_err());
    }
}
