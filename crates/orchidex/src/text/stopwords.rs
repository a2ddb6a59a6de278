use ahash::AHashSet;
use once_cell::sync::Lazy;

/// English stop-words. Contracted forms are omitted because the normalizer
/// drops every token that is not purely alphanumeric before this lookup.
const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
    "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "couldn", "didn",
    "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn", "needn", "shan",
    "shouldn", "wasn", "weren", "won", "wouldn",
];

static STOPWORDS: Lazy<AHashSet<&'static str>> =
    Lazy::new(|| ENGLISH_STOPWORDS.iter().copied().collect());

/// Whether an already lower-cased token is an English stop-word.
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_function_words_are_stopwords() {
        for word in ["the", "with", "and", "i", "some", "very"] {
            assert!(is_stopword(word), "{word}");
        }
    }

    #[test]
    fn test_content_words_are_not_stopwords() {
        for word in ["orchid", "pink", "fragrant", "asia", "want"] {
            assert!(!is_stopword(word), "{word}");
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(!is_stopword("The"));
    }
}
