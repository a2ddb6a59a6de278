use std::ops::Deref;

use super::filters::OrchidFilters;
use crate::store::OrchidRecord;

/// The four query shapes the planner understands.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrchidQuery {
    /// Free text, normalized, synonym-expanded and ranked.
    NaturalLanguage(String),
    /// Raw full-text engine syntax.
    FullText(String),
    /// Structured constraints only.
    Filters(OrchidFilters),
    /// Optional free text AND structured constraints.
    Combined {
        text: Option<String>,
        filters: OrchidFilters,
    },
}

/// A natural-language match with its relevance score.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    pub record: OrchidRecord,
    pub score: u32,
}

impl Deref for Candidate {
    type Target = OrchidRecord;

    fn deref(&self) -> &Self::Target {
        &self.record
    }
}

/// Output of [`OrchidQuery`] dispatch: ranked for natural language, plain otherwise.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchResults {
    Ranked(Vec<Candidate>),
    Records(Vec<OrchidRecord>),
}

impl SearchResults {
    pub fn len(&self) -> usize {
        match self {
            Self::Ranked(candidates) => candidates.len(),
            Self::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_ranked(&self) -> bool {
        matches!(self, Self::Ranked(_))
    }

    /// The records, in result order.
    pub fn records(&self) -> Vec<&OrchidRecord> {
        match self {
            Self::Ranked(candidates) => candidates.iter().map(|c| &c.record).collect(),
            Self::Records(records) => records.iter().collect(),
        }
    }

    pub fn into_records(self) -> Vec<OrchidRecord> {
        match self {
            Self::Ranked(candidates) => candidates.into_iter().map(|c| c.record).collect(),
            Self::Records(records) => records,
        }
    }
}

/// One page of the whole catalog.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BrowsePage {
    pub records: Vec<OrchidRecord>,
    /// Records in the catalog.
    pub total: usize,
    /// 1-based page number.
    pub page: usize,
    pub total_pages: usize,
}

impl BrowsePage {
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
