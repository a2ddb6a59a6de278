//! Curated synonym groups for flower colors and geographic regions.
//!
//! Expansion runs one pass per domain. Colors match by exact term membership;
//! regions match when the group name contains the token or the token is one of
//! the group's terms. Within a domain the first matching group in table order
//! wins, so `"asia"` lands in `southeast asia` before the plain `asia` group.

use itertools::Itertools;
use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SynonymDomain {
    FlowerColor,
    Region,
}

/// A named set of interchangeable terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynonymGroup {
    pub name: &'static str,
    pub domain: SynonymDomain,
    pub terms: &'static [&'static str],
}

impl SynonymGroup {
    pub const fn color(name: &'static str, terms: &'static [&'static str]) -> Self {
        Self {
            name,
            domain: SynonymDomain::FlowerColor,
            terms,
        }
    }

    pub const fn region(name: &'static str, terms: &'static [&'static str]) -> Self {
        Self {
            name,
            domain: SynonymDomain::Region,
            terms,
        }
    }

    fn matches(&self, token: &str) -> bool {
        let member = self.terms.contains(&token);
        match self.domain {
            SynonymDomain::FlowerColor => member,
            SynonymDomain::Region => member || (!token.is_empty() && self.name.contains(token)),
        }
    }
}

const COLOR_GROUPS: [SynonymGroup; 8] = [
    SynonymGroup::color("pink", &["pink", "rose", "magenta", "fuchsia"]),
    SynonymGroup::color("white", &["white", "cream", "ivory", "pale"]),
    SynonymGroup::color("yellow", &["yellow", "gold", "golden", "lemon"]),
    SynonymGroup::color("purple", &["purple", "violet", "lavender", "mauve"]),
    SynonymGroup::color("red", &["red", "crimson", "scarlet", "burgundy"]),
    SynonymGroup::color("orange", &["orange", "coral", "peach", "apricot"]),
    SynonymGroup::color("blue", &["blue", "azure", "indigo"]),
    SynonymGroup::color("green", &["green", "lime", "chartreuse"]),
];

const REGION_GROUPS: [SynonymGroup; 4] = [
    SynonymGroup::region(
        "southeast asia",
        &[
            "southeast asia",
            "se asia",
            "philippines",
            "indonesia",
            "thailand",
            "vietnam",
            "malaysia",
        ],
    ),
    SynonymGroup::region(
        "south america",
        &["south america", "brazil", "colombia", "ecuador", "peru"],
    ),
    SynonymGroup::region(
        "central america",
        &["central america", "mexico", "costa rica", "panama"],
    ),
    SynonymGroup::region("asia", &["asia", "china", "japan", "india", "taiwan"]),
];

static DEFAULT_TABLE: Lazy<SynonymTable> = Lazy::new(|| SynonymTable {
    colors: COLOR_GROUPS.to_vec(),
    regions: REGION_GROUPS.to_vec(),
});

/// Ordered color and region groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymTable {
    colors: Vec<SynonymGroup>,
    regions: Vec<SynonymGroup>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

impl SynonymTable {
    /// The shared built-in table.
    pub fn builtin() -> &'static Self {
        &DEFAULT_TABLE
    }

    /// Build a table from custom groups. Table order is match priority.
    pub fn new(groups: impl IntoIterator<Item = SynonymGroup>) -> Self {
        let (colors, regions) = groups
            .into_iter()
            .partition(|group| group.domain == SynonymDomain::FlowerColor);
        Self { colors, regions }
    }

    pub fn groups(&self) -> impl Iterator<Item = &SynonymGroup> {
        self.colors.iter().chain(&self.regions)
    }

    /// First group of `domain` that accepts the token.
    pub fn lookup(&self, domain: SynonymDomain, token: &str) -> Option<&SynonymGroup> {
        let token = token.trim().to_lowercase();
        let groups = match domain {
            SynonymDomain::FlowerColor => &self.colors,
            SynonymDomain::Region => &self.regions,
        };
        groups.iter().find(|group| group.matches(&token))
    }

    /// Expand a token into itself plus the terms of the first matching color
    /// group and the first matching region group. Deduplicated, token first.
    pub fn expand(&self, token: &str) -> Vec<String> {
        let token = token.trim().to_lowercase();
        let color = self.lookup(SynonymDomain::FlowerColor, &token);
        let region = self.lookup(SynonymDomain::Region, &token);

        std::iter::once(token.as_str())
            .chain(color.into_iter().flat_map(|group| group.terms.iter().copied()))
            .chain(region.into_iter().flat_map(|group| group.terms.iter().copied()))
            .unique()
            .map(str::to_string)
            .collect()
    }
}

/// Expand a token with the built-in table.
pub fn expand(token: &str) -> Vec<String> {
    SynonymTable::builtin().expand(token)
}
