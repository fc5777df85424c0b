//! Slug generation.
//!
//! Slugs are the URL segments of the content tree. They are lowercase,
//! stripped of diacritics and consist of `[a-z0-9]` runs joined by `-`.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Derive a URL-safe slug from a display name.
///
/// Examples:
/// - "Café Déjà-vu" -> "cafe-deja-vu"
/// - "  Release Notes (2024) " -> "release-notes-2024"
/// - "???" -> ""
pub fn slugify(name: &str) -> String {
    let folded: String = name
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .nfc()
        .collect::<String>()
        .to_lowercase();

    folded
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Return `slug`, or the first `slug-N` (N >= 2) not yet taken.
pub fn disambiguate<F>(slug: &str, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    if !is_taken(slug) {
        return slug.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", slug, n))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| slug.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slugify_diacritics() {
        assert_eq!(slugify("Café Déjà-vu"), "cafe-deja-vu");
        assert_eq!(slugify("Ärger über Öl"), "arger-uber-ol");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("?!"), "");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  Release Notes (2024) "), "release-notes-2024");
        assert_eq!(slugify("a__b--c  d"), "a-b-c-d");
        assert_eq!(slugify("--leading and trailing--"), "leading-and-trailing");
    }

    #[test]
    fn test_slugify_non_latin_is_dropped() {
        assert_eq!(slugify("日本 notes"), "notes");
        assert_eq!(slugify("ß"), "");
    }

    #[test]
    fn test_slugify_idempotent() {
        for input in [
            "Café Déjà-vu",
            "  Release Notes (2024) ",
            "ALL CAPS",
            "x",
            "",
            "Ünïcödé-Ñame_42.md",
        ] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_disambiguate() {
        let taken: HashSet<&str> = ["notes", "notes-2"].into_iter().collect();
        assert_eq!(disambiguate("notes", |s| taken.contains(s)), "notes-3");
        assert_eq!(disambiguate("other", |s| taken.contains(s)), "other");
    }
}
