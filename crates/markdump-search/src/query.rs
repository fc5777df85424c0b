//! Free-text input normalization and query construction.

use std::collections::HashSet;

use tantivy::query::{BooleanQuery, FuzzyTermQuery, Occur, Query, RegexQuery};
use tantivy::Term;

use crate::error::SearchError;
use crate::schema::SearchSchema;

/// Input beyond this many characters is ignored.
pub const MAX_INPUT_CHARS: usize = 128;

/// Only the first words of the input are used.
pub const MAX_WORDS: usize = 4;

/// Longer words are dropped.
pub const MAX_WORD_CHARS: usize = 32;

/// Edit distance allowed by the fuzzy strategy.
pub const FUZZY_DISTANCE: u8 = 1;

/// Turn raw input into the list of query words.
///
/// Steps: truncate, lowercase, split on whitespace, keep the first
/// [`MAX_WORDS`], drop words over [`MAX_WORD_CHARS`], deduplicate.
/// Lowercasing happens here because fuzzy and regex queries skip the
/// field tokenizer.
pub fn normalize_query(input: &str) -> Vec<String> {
    let truncated: String = input.chars().take(MAX_INPUT_CHARS).collect();
    let lowered = truncated.to_lowercase();

    let mut seen = HashSet::new();
    lowered
        .split_whitespace()
        .take(MAX_WORDS)
        .filter(|word| word.chars().count() <= MAX_WORD_CHARS)
        .filter(|word| seen.insert(*word))
        .map(str::to_string)
        .collect()
}

/// Build the boolean query for normalized words.
///
/// Every word must match the `all` field by at least one of: fuzzy
/// (distance 1), prefix, or substring. Returns `None` for no words, which
/// callers treat as "no results" rather than "match everything".
pub fn build_query(
    schema: &SearchSchema,
    words: &[String],
) -> Result<Option<Box<dyn Query>>, SearchError> {
    if words.is_empty() {
        return Ok(None);
    }

    let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(words.len());
    for word in words {
        clauses.push((Occur::Must, word_query(schema, word)?));
    }

    Ok(Some(Box::new(BooleanQuery::new(clauses))))
}

fn word_query(schema: &SearchSchema, word: &str) -> Result<Box<dyn Query>, SearchError> {
    let escaped = regex::escape(word);

    let fuzzy = FuzzyTermQuery::new(
        Term::from_field_text(schema.all, word),
        FUZZY_DISTANCE,
        false,
    );
    let prefix = RegexQuery::from_pattern(&format!("{}.*", escaped), schema.all)?;
    let substring = RegexQuery::from_pattern(&format!(".*{}.*", escaped), schema.all)?;

    Ok(Box::new(BooleanQuery::new(vec![
        (Occur::Should, Box::new(fuzzy) as Box<dyn Query>),
        (Occur::Should, Box::new(prefix)),
        (Occur::Should, Box::new(substring)),
    ])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::build_search_schema;

    #[test]
    fn test_lowercase_and_split() {
        assert_eq!(normalize_query("Quick  FOX\tjumps"), vec!["quick", "fox", "jumps"]);
    }

    #[test]
    fn test_keeps_first_four_words() {
        assert_eq!(
            normalize_query("one two three four five"),
            vec!["one", "two", "three", "four"]
        );
    }

    #[test]
    fn test_drops_long_words() {
        let long = "x".repeat(40);
        assert!(normalize_query(&long).is_empty());

        let exactly = "y".repeat(MAX_WORD_CHARS);
        assert_eq!(normalize_query(&exactly), vec![exactly.clone()]);
    }

    #[test]
    fn test_word_limit_applies_before_dropping() {
        let long = "x".repeat(40);
        let input = format!("a b c {} d", long);
        assert_eq!(normalize_query(&input), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_truncates_before_tokenizing() {
        let input = format!("{} abcdef", "b".repeat(126));
        // 126 + 1 space + "a" = 128 chars survive; the b-run is too long
        assert_eq!(normalize_query(&input), vec!["a"]);
    }

    #[test]
    fn test_truncation_counts_characters() {
        let input = format!("{}é tail", "é ".repeat(63));
        assert_eq!(normalize_query(&input), vec!["é"]);
    }

    #[test]
    fn test_deduplicates() {
        assert_eq!(normalize_query("fox Fox FOX dog"), vec!["fox", "dog"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_query("").is_empty());
        assert!(normalize_query(" \t\n ").is_empty());
    }

    #[test]
    fn test_build_query_empty_is_none() {
        let schema = build_search_schema();
        assert!(build_query(&schema, &[]).unwrap().is_none());
    }

    #[test]
    fn test_build_query_escapes_regex() {
        let schema = build_search_schema();
        let words = vec!["c++".to_string(), "a.b".to_string(), "(x)".to_string()];
        assert!(build_query(&schema, &words).unwrap().is_some());
    }
}
