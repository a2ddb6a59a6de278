//! Rule-based noun lemmatizer.
//!
//! Reduces plural nouns to their singular form: irregular plurals come from an
//! exception table, regular ones are handled by suffix rules. Words that merely
//! end in `s` (`genus`, `iris`, `grass`) are left alone.

use ahash::AHashMap;
use once_cell::sync::Lazy;

static EXCEPTIONS: Lazy<AHashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("leaves", "leaf"),
        ("genera", "genus"),
        ("species", "species"),
        ("series", "series"),
        ("women", "woman"),
        ("men", "man"),
        ("children", "child"),
        ("mice", "mouse"),
        ("geese", "goose"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("lives", "life"),
        ("knives", "knife"),
        ("wives", "wife"),
        ("halves", "half"),
        ("calves", "calf"),
        ("wolves", "wolf"),
        ("shelves", "shelf"),
        ("fungi", "fungus"),
        ("cacti", "cactus"),
        ("bacteria", "bacterium"),
        ("criteria", "criterion"),
        ("phenomena", "phenomenon"),
        ("stomata", "stoma"),
        ("pollinia", "pollinium"),
        ("potatoes", "potato"),
        ("tomatoes", "tomato"),
    ]
    .into_iter()
    .collect()
});

/// Suffixes that are never plural markers.
const SINGULAR_ENDINGS: [&str; 4] = ["ss", "us", "is", "ous"];

/// Sibilant endings whose plural adds `es`.
const SIBILANT_PLURALS: [&str; 5] = ["sses", "ches", "shes", "xes", "zes"];

/// Lemmatize a lower-cased token as a noun.
pub fn lemmatize(token: &str) -> String {
    if let Some(lemma) = EXCEPTIONS.get(token) {
        return (*lemma).to_string();
    }
    if token.chars().count() <= 3 || !token.ends_with('s') {
        return token.to_string();
    }
    if SINGULAR_ENDINGS.iter().any(|ending| token.ends_with(ending)) {
        return token.to_string();
    }
    if let Some(stem) = token.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if SIBILANT_PLURALS.iter().any(|ending| token.ends_with(ending)) {
        return token[..token.len() - 2].to_string();
    }
    token[..token.len() - 1].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plurals() {
        assert_eq!(lemmatize("orchids"), "orchid");
        assert_eq!(lemmatize("flowers"), "flower");
        assert_eq!(lemmatize("roses"), "rose");
        assert_eq!(lemmatize("colors"), "color");
    }

    #[test]
    fn test_ies_and_sibilant_plurals() {
        assert_eq!(lemmatize("lilies"), "lily");
        assert_eq!(lemmatize("butterflies"), "butterfly");
        assert_eq!(lemmatize("branches"), "branch");
        assert_eq!(lemmatize("bushes"), "bush");
        assert_eq!(lemmatize("boxes"), "box");
        assert_eq!(lemmatize("glasses"), "glass");
    }

    #[test]
    fn test_irregular_plurals() {
        assert_eq!(lemmatize("leaves"), "leaf");
        assert_eq!(lemmatize("genera"), "genus");
        assert_eq!(lemmatize("species"), "species");
    }

    #[test]
    fn test_words_that_are_already_singular() {
        for word in ["genus", "iris", "grass", "fragrant", "asia", "gas", "bus", "various"] {
            assert_eq!(lemmatize(word), word);
        }
    }
}
