//! Text normalization for natural-language queries.
//!
//! A query is lower-cased and split into word tokens; anything that is not
//! purely alphanumeric is dropped, as are English stop-words, and the
//! remaining tokens are reduced to their noun lemma.

mod lemma;
mod stopwords;

pub use lemma::lemmatize;
pub use stopwords::is_stopword;

use once_cell::sync::Lazy;
use regex::Regex;

/// Word runs (hyphenated compounds kept whole), clitics such as `'s`, or
/// single punctuation marks.
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+(?:-\w+)*|'\w+|[^\w\s]").expect("token pattern is valid"));

/// Split lower-cased text into raw tokens, punctuation included.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Normalize free text into content tokens.
///
/// Order and duplicates are preserved; blank input yields no tokens.
pub fn normalize(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    tokenize(text)
        .into_iter()
        .filter(|token| token.chars().all(char::is_alphanumeric))
        .filter(|token| !is_stopword(token))
        .map(|token| lemmatize(&token))
        .collect()
}
