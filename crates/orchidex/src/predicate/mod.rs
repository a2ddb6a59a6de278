//! Typed filter trees.
//!
//! Search paths describe what a record must satisfy as a [`Predicate`]. The
//! store turns it into a polars expression with [`Predicate::to_expr`]; user
//! text only ever reaches the engine as an escaped, case-insensitive regex
//! literal. [`Predicate::matches`] evaluates the same tree against a single
//! record in process. Null cells never satisfy a leaf.

use polars::prelude::*;

use crate::store::OrchidRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Always,
    Never,
    /// Case-insensitive substring match.
    Contains {
        column: &'static str,
        needle: String,
    },
    /// Case-insensitive substring match against any of the needles.
    ContainsAny {
        column: &'static str,
        needles: Vec<String>,
    },
    /// Case-insensitive whole-value match.
    Equals {
        column: &'static str,
        value: String,
    },
    AtLeast {
        column: &'static str,
        bound: f64,
    },
    AtMost {
        column: &'static str,
        bound: f64,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn contains(column: &'static str, needle: impl Into<String>) -> Self {
        Self::Contains {
            column,
            needle: needle.into(),
        }
    }

    pub fn contains_any<S: Into<String>>(
        column: &'static str,
        needles: impl IntoIterator<Item = S>,
    ) -> Self {
        let needles: Vec<String> = needles.into_iter().map(Into::into).collect();
        if needles.is_empty() {
            Self::Never
        } else {
            Self::ContainsAny { column, needles }
        }
    }

    pub fn equals(column: &'static str, value: impl Into<String>) -> Self {
        Self::Equals {
            column,
            value: value.into(),
        }
    }

    pub const fn at_least(column: &'static str, bound: f64) -> Self {
        Self::AtLeast { column, bound }
    }

    pub const fn at_most(column: &'static str, bound: f64) -> Self {
        Self::AtMost { column, bound }
    }

    /// Conjunction. `Always` operands are dropped and a `Never` operand wins.
    pub fn and(predicates: impl IntoIterator<Item = Self>) -> Self {
        let mut operands = Vec::new();
        for predicate in predicates {
            match predicate {
                Self::Always => {}
                Self::Never => return Self::Never,
                Self::And(inner) => operands.extend(inner),
                other => operands.push(other),
            }
        }
        match operands.len() {
            0 => Self::Always,
            1 => operands.remove(0),
            _ => Self::And(operands),
        }
    }

    /// Disjunction. `Never` operands are dropped and an `Always` operand wins.
    pub fn or(predicates: impl IntoIterator<Item = Self>) -> Self {
        let mut operands = Vec::new();
        for predicate in predicates {
            match predicate {
                Self::Never => {}
                Self::Always => return Self::Always,
                Self::Or(inner) => operands.extend(inner),
                other => operands.push(other),
            }
        }
        match operands.len() {
            0 => Self::Never,
            1 => operands.remove(0),
            _ => Self::Or(operands),
        }
    }

    /// Substring match of one needle over several columns, OR-combined.
    pub fn contains_in_any(columns: &[&'static str], needle: &str) -> Self {
        Self::or(
            columns
                .iter()
                .map(|column| Self::contains(*column, needle.to_string())),
        )
    }

    /// Polars boolean expression selecting the rows that satisfy the tree.
    pub fn to_expr(&self) -> Expr {
        match self {
            Self::Always => lit(true),
            Self::Never => lit(false),
            Self::Contains { column, needle } => {
                text_matches(column, format!("(?i){}", regex::escape(needle)))
            }
            Self::ContainsAny { column, needles } => {
                let alternation = needles
                    .iter()
                    .map(|needle| regex::escape(needle))
                    .collect::<Vec<_>>()
                    .join("|");
                text_matches(column, format!("(?i)(?:{alternation})"))
            }
            Self::Equals { column, value } => {
                text_matches(column, format!("(?i)^{}$", regex::escape(value)))
            }
            Self::AtLeast { column, bound } => col(*column)
                .cast(DataType::Float64)
                .gt_eq(lit(*bound))
                .fill_null(lit(false)),
            Self::AtMost { column, bound } => col(*column)
                .cast(DataType::Float64)
                .lt_eq(lit(*bound))
                .fill_null(lit(false)),
            Self::And(operands) => operands
                .iter()
                .map(Self::to_expr)
                .reduce(|acc, expr| acc.and(expr))
                .unwrap_or_else(|| lit(true)),
            Self::Or(operands) => operands
                .iter()
                .map(Self::to_expr)
                .reduce(|acc, expr| acc.or(expr))
                .unwrap_or_else(|| lit(false)),
        }
    }

    /// Evaluate against a single record.
    pub fn matches(&self, record: &OrchidRecord) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Contains { column, needle } => record
                .display(column)
                .is_some_and(|value| contains_ignore_case(&value, needle)),
            Self::ContainsAny { column, needles } => record.display(column).is_some_and(|value| {
                needles
                    .iter()
                    .any(|needle| contains_ignore_case(&value, needle))
            }),
            Self::Equals { column, value } => record
                .display(column)
                .is_some_and(|actual| actual.to_lowercase() == value.to_lowercase()),
            Self::AtLeast { column, bound } => {
                record.number(column).is_some_and(|value| value >= *bound)
            }
            Self::AtMost { column, bound } => {
                record.number(column).is_some_and(|value| value <= *bound)
            }
            Self::And(operands) => operands.iter().all(|p| p.matches(record)),
            Self::Or(operands) => operands.iter().any(|p| p.matches(record)),
        }
    }

    /// Columns referenced anywhere in the tree.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns(&self, out: &mut Vec<&'static str>) {
        match self {
            Self::Always | Self::Never => {}
            Self::Contains { column, .. }
            | Self::ContainsAny { column, .. }
            | Self::Equals { column, .. }
            | Self::AtLeast { column, .. }
            | Self::AtMost { column, .. } => {
                if !out.contains(column) {
                    out.push(*column);
                }
            }
            Self::And(operands) | Self::Or(operands) => {
                for operand in operands {
                    operand.collect_columns(out);
                }
            }
        }
    }
}

fn text_matches(column: &str, pattern: String) -> Expr {
    col(column)
        .cast(DataType::String)
        .str()
        .contains(lit(pattern), false)
        .fill_null(lit(false))
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FieldValue;
    use orchidex_data_processing::columns;

    fn vanda() -> OrchidRecord {
        OrchidRecord::from_values(
            1,
            [
                (columns::GENUS, FieldValue::Text("Vanda".into())),
                (
                    columns::SCIENTIFIC_NAME,
                    FieldValue::Text("Vanda coerulea".into()),
                ),
                (columns::FLOWER_COLOR, FieldValue::Text("Blue (rare)".into())),
                (columns::TEMPERATURE_MIN_C, FieldValue::Real(10.0)),
                (columns::TEMPERATURE_MAX_C, FieldValue::Real(28.0)),
            ],
        )
    }

    fn sample_frame() -> DataFrame {
        df! {
            columns::GENUS => [Some("Vanda"), Some("Cattleya"), None],
            columns::FLOWER_COLOR => [Some("Blue (rare)"), Some("Lavender pink"), Some("White")],
            columns::TEMPERATURE_MIN_C => [Some(10.0), Some(15.0), None],
        }
        .unwrap()
    }

    fn matching_rows(predicate: &Predicate) -> usize {
        sample_frame()
            .lazy()
            .filter(predicate.to_expr())
            .collect()
            .unwrap()
            .height()
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let p = Predicate::contains(columns::GENUS, "vAnD");
        assert!(p.matches(&vanda()));
        assert_eq!(matching_rows(&p), 1);
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let p = Predicate::contains(columns::FLOWER_COLOR, "(rare)");
        assert!(p.matches(&vanda()));
        assert_eq!(matching_rows(&p), 1);

        let p = Predicate::contains(columns::FLOWER_COLOR, ".*");
        assert!(!p.matches(&vanda()));
        assert_eq!(matching_rows(&p), 0);
    }

    #[test]
    fn test_nulls_never_match() {
        let p = Predicate::contains(columns::GENUS, "a");
        assert_eq!(matching_rows(&p), 2);
        let p = Predicate::at_most(columns::TEMPERATURE_MIN_C, 100.0);
        assert_eq!(matching_rows(&p), 2);
        assert!(!Predicate::contains(columns::COMMON_NAMES, "").matches(&vanda()));
    }

    #[test]
    fn test_numeric_bounds() {
        assert!(Predicate::at_least(columns::TEMPERATURE_MIN_C, 10.0).matches(&vanda()));
        assert!(!Predicate::at_least(columns::TEMPERATURE_MIN_C, 10.5).matches(&vanda()));
        assert!(Predicate::at_most(columns::TEMPERATURE_MAX_C, 28.0).matches(&vanda()));
        assert_eq!(
            matching_rows(&Predicate::at_least(columns::TEMPERATURE_MIN_C, 12.0)),
            1
        );
    }

    #[test]
    fn test_equals_is_whole_value() {
        assert!(Predicate::equals(columns::GENUS, "vanda").matches(&vanda()));
        assert!(!Predicate::equals(columns::GENUS, "van").matches(&vanda()));
        assert_eq!(matching_rows(&Predicate::equals(columns::GENUS, "CATTLEYA")), 1);
    }

    #[test]
    fn test_contains_any() {
        let p = Predicate::contains_any(columns::FLOWER_COLOR, ["pink", "white"]);
        assert!(!p.matches(&vanda()));
        assert_eq!(matching_rows(&p), 2);
        assert_eq!(
            Predicate::contains_any(columns::GENUS, Vec::<String>::new()),
            Predicate::Never
        );
    }

    #[test]
    fn test_and_or_simplification() {
        let leaf = Predicate::contains(columns::GENUS, "vanda");
        assert_eq!(Predicate::and([]), Predicate::Always);
        assert_eq!(Predicate::or([]), Predicate::Never);
        assert_eq!(
            Predicate::and([Predicate::Always, leaf.clone()]),
            leaf.clone()
        );
        assert_eq!(
            Predicate::and([leaf.clone(), Predicate::Never]),
            Predicate::Never
        );
        assert_eq!(
            Predicate::or([leaf.clone(), Predicate::Always]),
            Predicate::Always
        );
    }

    #[test]
    fn test_tree_evaluation_agrees_with_expression() {
        let p = Predicate::and([
            Predicate::contains_in_any(&[columns::GENUS, columns::FLOWER_COLOR], "pink"),
            Predicate::at_least(columns::TEMPERATURE_MIN_C, 12.0),
        ]);
        assert!(!p.matches(&vanda()));
        assert_eq!(matching_rows(&p), 1);
        assert_eq!(
            p.columns(),
            vec![
                columns::GENUS,
                columns::FLOWER_COLOR,
                columns::TEMPERATURE_MIN_C
            ]
        );
    }
}
