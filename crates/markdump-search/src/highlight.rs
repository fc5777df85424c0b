//! Result highlighting.
//!
//! Fuzzy and regex queries do not report which terms they matched, so the
//! highlighter re-tokenizes the stored text with the field's own analyzer and
//! marks every token that one of the query words would have matched.

use levenshtein_automata::{Distance, LevenshteinAutomatonBuilder, DFA};
use once_cell::sync::Lazy;
use tantivy::tokenizer::TextAnalyzer;

use crate::query::FUZZY_DISTANCE;

/// Target length of a fragment in bytes.
pub const FRAGMENT_SIZE: usize = 200;

/// Context kept in front of the first highlighted term.
const LEADING_CONTEXT: usize = 40;

const MARK_START: &str = "<mark>";
const MARK_END: &str = "</mark>";
const ELLIPSIS: &str = "…";

static LEV_BUILDER: Lazy<LevenshteinAutomatonBuilder> =
    Lazy::new(|| LevenshteinAutomatonBuilder::new(FUZZY_DISTANCE, false));

/// Byte range of a matched term in stored text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermLocation {
    pub start: usize,
    pub end: usize,
}

/// Locates terms matching a set of normalized query words.
pub struct Highlighter {
    words: Vec<(String, DFA)>,
}

impl Highlighter {
    pub fn new(words: &[String]) -> Self {
        let words = words
            .iter()
            .map(|word| (word.clone(), LEV_BUILDER.build_dfa(word)))
            .collect();
        Self { words }
    }

    /// Whether a token satisfies any strategy of any word.
    pub fn matches(&self, token: &str) -> bool {
        self.words.iter().any(|(word, dfa)| {
            token.contains(word.as_str()) || matches!(dfa.eval(token), Distance::Exact(_))
        })
    }

    /// Locations of matching tokens in `text`, in text order.
    pub fn locate(&self, analyzer: &mut TextAnalyzer, text: &str) -> Vec<TermLocation> {
        let mut locations = Vec::new();
        let mut stream = analyzer.token_stream(text);
        while stream.advance() {
            let token = stream.token();
            if self.matches(&token.text) {
                locations.push(TermLocation {
                    start: token.offset_from,
                    end: token.offset_to,
                });
            }
        }
        locations
    }
}

/// Best excerpt of `text` around `locations`, with matches wrapped in
/// `<mark>` and everything else HTML-escaped.
///
/// Returns an empty string when there is nothing to highlight.
pub fn fragment(locations: &[TermLocation], text: &str) -> String {
    let mut locations: Vec<TermLocation> = locations
        .iter()
        .copied()
        .filter(|loc| loc.start < loc.end && loc.end <= text.len())
        .collect();
    if locations.is_empty() {
        return String::new();
    }
    locations.sort_by_key(|loc| loc.start);

    // Rendered window holding the most locations; earliest wins ties.
    let ((start, end), _) = locations
        .iter()
        .map(|anchor| {
            let (start, end) = window(text, *anchor);
            let covered = locations
                .iter()
                .filter(|l| l.start >= start && l.end <= end)
                .count();
            ((start, end), covered)
        })
        .fold(((0, 0), 0), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        });

    let mut out = String::with_capacity(end - start + 32);
    if start > 0 {
        out.push_str(ELLIPSIS);
    }

    let mut cursor = start;
    for loc in locations
        .iter()
        .filter(|loc| loc.start >= start && loc.end <= end)
    {
        if loc.start < cursor {
            continue;
        }
        out.push_str(&escape_html(&text[cursor..loc.start]));
        out.push_str(MARK_START);
        out.push_str(&escape_html(&text[loc.start..loc.end]));
        out.push_str(MARK_END);
        cursor = loc.end;
    }
    out.push_str(&escape_html(&text[cursor..end]));

    if end < text.len() {
        out.push_str(ELLIPSIS);
    }
    out
}

/// Byte range rendered for a fragment anchored at `anchor`.
fn window(text: &str, anchor: TermLocation) -> (usize, usize) {
    let start = floor_boundary(text, anchor.start.saturating_sub(LEADING_CONTEXT));
    let end = ceil_boundary(text, (start + FRAGMENT_SIZE).max(anchor.end).min(text.len()));
    (start, end)
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
