//! Pre-parsing of raw full-text queries.
//!
//! Tantivy's query parser reads `vand*` as the literal term `vand`, so prefix
//! terms are lifted out of the query here and turned into regex queries by the
//! caller. The same pass rejects operators with a missing operand
//! (`pink AND`, `OR blue`), which the parser would otherwise accept silently.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tantivy::query::Occur;

use super::{IndexError, error::Result};

/// `vand*`, `+vand*`, `-vand*`, `Genus:vand*` or `"vand"*`.
static PREFIX_TERM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?P<modifier>[+-]?)(?:(?P<field>[A-Za-z_][A-Za-z0-9_]*):)?(?:"(?P<quoted>[\p{L}\p{N}]+)"|(?P<bare>[\p{L}\p{N}]+))\*$"#,
    )
    .expect("prefix term pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct PrefixTerm {
    pub field: Option<String>,
    /// Lower-cased, as the default tokenizer stores terms.
    pub stem: String,
    /// Set when the term carried `+`, `-` or a preceding `NOT`.
    pub occur: Option<Occur>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RewrittenQuery {
    /// The query with prefix terms (and the operators joining them) removed.
    pub remainder: String,
    /// Every remaining operand was negated. The remainder then lists them
    /// un-negated and the caller excludes its matches.
    pub negated: bool,
    pub prefixes: Vec<PrefixTerm>,
    /// A top-level `OR` was present.
    pub disjunctive: bool,
}

fn is_binary(token: &str) -> bool {
    matches!(token, "AND" | "OR")
}

/// Whitespace-separated tokens outside quotes and parentheses.
fn top_level_tokens(query: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    let mut depth = 0_usize;
    let mut in_quote = false;

    for (i, c) in query.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && !in_quote && depth == 0 => {
                if let Some(s) = start.take() {
                    tokens.push(&query[s..i]);
                }
                continue;
            }
            _ => {}
        }
        start.get_or_insert(i);
    }
    if let Some(s) = start {
        tokens.push(&query[s..]);
    }
    tokens
}

fn check_operators(tokens: &[&str]) -> Result<()> {
    if let Some(first) = tokens.first().filter(|t| is_binary(t)) {
        return Err(IndexError::QuerySyntax(format!(
            "'{first}' is missing its left operand"
        )));
    }
    if let Some(last) = tokens
        .last()
        .filter(|t| is_binary(t) || **t == "NOT")
    {
        return Err(IndexError::QuerySyntax(format!(
            "'{last}' is missing its right operand"
        )));
    }
    for pair in tokens.windows(2) {
        if (is_binary(pair[0]) || pair[0] == "NOT") && is_binary(pair[1]) {
            return Err(IndexError::QuerySyntax(format!(
                "'{}' cannot follow '{}'",
                pair[1], pair[0]
            )));
        }
    }
    Ok(())
}

/// Split prefix terms out of a raw query after checking its operators.
pub(super) fn rewrite(query: &str) -> Result<RewrittenQuery> {
    let tokens = top_level_tokens(query);
    check_operators(&tokens)?;

    let mut keep = vec![true; tokens.len()];
    let mut prefixes = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let Some(caps) = PREFIX_TERM.captures(token) else {
            continue;
        };
        keep[i] = false;

        let mut occur = match &caps["modifier"] {
            "+" => Some(Occur::Must),
            "-" => Some(Occur::MustNot),
            _ => None,
        };
        let mut left = i.checked_sub(1);
        if let Some(j) = left.filter(|&j| tokens[j] == "NOT") {
            occur = Some(Occur::MustNot);
            keep[j] = false;
            left = j.checked_sub(1);
        }

        // Drop the operator joining this term to its neighbour
        if let Some(j) = left.filter(|&j| keep[j] && is_binary(tokens[j])) {
            keep[j] = false;
        } else if let Some(j) = Some(i + 1).filter(|&j| j < tokens.len() && is_binary(tokens[j])) {
            keep[j] = false;
        }

        let stem = caps
            .name("quoted")
            .or_else(|| caps.name("bare"))
            .map_or_else(String::new, |m| m.as_str().to_lowercase());
        prefixes.push(PrefixTerm {
            field: caps.name("field").map(|m| m.as_str().to_string()),
            stem,
            occur,
        });
    }

    let kept: Vec<&str> = tokens
        .iter()
        .zip(&keep)
        .filter_map(|(token, keep)| keep.then_some(*token))
        .collect();
    let operands: Vec<usize> = (0..kept.len())
        .filter(|&k| !is_binary(kept[k]) && kept[k] != "NOT")
        .collect();
    // A purely negative remainder matches nothing on its own
    let negated = !prefixes.is_empty()
        && !operands.is_empty()
        && operands
            .iter()
            .all(|&k| kept[k].starts_with('-') || (k > 0 && kept[k - 1] == "NOT"));
    let remainder = if negated {
        operands
            .iter()
            .map(|&k| kept[k].strip_prefix('-').unwrap_or(kept[k]))
            .join(" OR ")
    } else {
        kept.join(" ")
    };

    Ok(RewrittenQuery {
        remainder,
        negated,
        prefixes,
        disjunctive: tokens.contains(&"OR"),
    })
}
