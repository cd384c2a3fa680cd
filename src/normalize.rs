//! Title normalization
//!
//! Two pure functions derived from a post title:
//! - [`normalize_title`] gives the canonical form stored in the unique
//!   `normalized_title` column. Titles that differ only in case, diacritics or
//!   whitespace normalize to the same string.
//! - [`slugify`] gives the URL-friendly slug. Slugs are not unique.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Decompose, strip combining marks and lowercase.
///
/// Decomposition runs again after lowercasing since some lowercase mappings
/// produce precomposed or marked characters.
fn fold(input: &str) -> String {
    let stripped: String = input.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    stripped
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Canonical form of a title used for uniqueness comparison.
///
/// Case-, diacritic- and whitespace-insensitive: "Hello  World",
/// " hello world " and "Héllo World" all normalize to `hello world`.
pub fn normalize_title(title: &str) -> String {
    fold(title).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Generate a URL-friendly slug from a title
///
/// Folds case and diacritics, replaces whitespace and punctuation with
/// hyphens, and removes consecutive and surrounding hyphens. Letters and
/// digits outside ASCII (CJK, Cyrillic, ...) are kept as they are.
pub fn slugify(title: &str) -> String {
    let mut result = String::new();
    let mut prev_hyphen = false;

    for c in fold(title).chars() {
        if c.is_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen && !result.is_empty() {
            result.push('-');
            prev_hyphen = true;
        }
    }

    result.trim_end_matches('-').to_string()
}
