use orchidex_data_processing::columns;
use tracing::warn;

use crate::predicate::Predicate;

/// Structured constraints for faceted search.
///
/// Every field is optional; absent or blank text means no constraint. Text
/// filters are case-insensitive substring matches, temperature bounds are
/// numeric and inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrchidFilters {
    pub genus: Option<String>,
    pub flower_color: Option<String>,
    pub native_region: Option<String>,
    pub fragrance: Option<String>,
    pub difficulty: Option<String>,
    /// Lower bound on `Temperature_Min_C`.
    pub min_temp: Option<f64>,
    /// Upper bound on `Temperature_Max_C`.
    pub max_temp: Option<f64>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl OrchidFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn genus(mut self, genus: impl Into<String>) -> Self {
        self.genus = Some(genus.into());
        self
    }

    pub fn flower_color(mut self, color: impl Into<String>) -> Self {
        self.flower_color = Some(color.into());
        self
    }

    pub fn native_region(mut self, region: impl Into<String>) -> Self {
        self.native_region = Some(region.into());
        self
    }

    pub fn fragrance(mut self, fragrance: impl Into<String>) -> Self {
        self.fragrance = Some(fragrance.into());
        self
    }

    pub fn difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    pub const fn min_temp(mut self, celsius: f64) -> Self {
        self.min_temp = Some(celsius);
        self
    }

    pub const fn max_temp(mut self, celsius: f64) -> Self {
        self.max_temp = Some(celsius);
        self
    }

    /// Build filters from loosely typed key/value pairs, as they arrive from a
    /// form or query string. Unknown keys and unparsable or non-finite numbers
    /// are skipped.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = Self::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "genus" => filters.genus = Some(value.to_string()),
                "flower_color" => filters.flower_color = Some(value.to_string()),
                "native_region" => filters.native_region = Some(value.to_string()),
                "fragrance" => filters.fragrance = Some(value.to_string()),
                "difficulty" => filters.difficulty = Some(value.to_string()),
                "min_temp" | "max_temp" => match value.trim().parse::<f64>() {
                    Ok(number) if !number.is_finite() => {
                        warn!(key, value, "Ignoring non-numeric temperature filter");
                    }
                    Ok(number) if key == "min_temp" => filters.min_temp = Some(number),
                    Ok(number) => filters.max_temp = Some(number),
                    Err(_) => warn!(key, value, "Ignoring non-numeric temperature filter"),
                },
                _ => warn!(key, "Ignoring unknown filter"),
            }
        }
        filters
    }

    /// True when no field constrains anything.
    pub fn is_empty(&self) -> bool {
        present(self.genus.as_ref()).is_none()
            && present(self.flower_color.as_ref()).is_none()
            && present(self.native_region.as_ref()).is_none()
            && present(self.fragrance.as_ref()).is_none()
            && present(self.difficulty.as_ref()).is_none()
            && self.min_temp.is_none()
            && self.max_temp.is_none()
    }

    fn shared_terms(&self) -> Vec<Predicate> {
        let mut terms = Vec::new();
        if let Some(genus) = present(self.genus.as_ref()) {
            terms.push(Predicate::contains(columns::GENUS, genus));
        }
        if let Some(color) = present(self.flower_color.as_ref()) {
            terms.push(Predicate::contains(columns::FLOWER_COLOR, color));
        }
        if let Some(region) = present(self.native_region.as_ref()) {
            terms.push(Predicate::contains(columns::NATIVE_REGIONS, region));
        }
        if let Some(difficulty) = present(self.difficulty.as_ref()) {
            terms.push(Predicate::contains(
                columns::HORTICULTURAL_DIFFICULTY,
                difficulty,
            ));
        }
        if let Some(min) = self.min_temp {
            terms.push(Predicate::at_least(columns::TEMPERATURE_MIN_C, min));
        }
        if let Some(max) = self.max_temp {
            terms.push(Predicate::at_most(columns::TEMPERATURE_MAX_C, max));
        }
        terms
    }

    /// Predicate for the faceted path. A fragrance of exactly `fragrant`
    /// matches either capitalisation in `Fragrance`.
    pub fn to_predicate(&self) -> Predicate {
        let mut terms = self.shared_terms();
        if let Some(fragrance) = present(self.fragrance.as_ref()) {
            terms.push(if fragrance.eq_ignore_ascii_case("fragrant") {
                Predicate::or([
                    Predicate::contains(columns::FRAGRANCE, "fragrant"),
                    Predicate::contains(columns::FRAGRANCE, "Fragrant"),
                ])
            } else {
                Predicate::contains(columns::FRAGRANCE, fragrance)
            });
        }
        Predicate::and(terms)
    }

    /// Predicate for the combined path, where fragrance also searches the
    /// free-text description.
    pub fn to_combined_predicate(&self) -> Predicate {
        let mut terms = self.shared_terms();
        if let Some(fragrance) = present(self.fragrance.as_ref()) {
            terms.push(Predicate::contains_in_any(
                &[columns::FRAGRANCE, columns::FRAGRANCE_DESCRIPTION],
                fragrance,
            ));
        }
        Predicate::and(terms)
    }
}
