//! Slug derivation for category titles.
//!
//! Slugs are lowercase ASCII letters, digits and single hyphens. Accented
//! letters are folded to their base letter before filtering.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Derives a URL-safe slug from a display title.
///
/// The title is decomposed and stripped of combining marks, lowercased, and
/// every run of separators (whitespace, `-`, `_`) becomes a single hyphen.
/// Any other character outside `[a-z0-9]` is dropped. Leading and trailing
/// separators never produce hyphens.
///
/// # Examples
///
/// ```
/// use marketplace_seed::slugify;
///
/// assert_eq!(slugify("Eletrodomésticos"), "eletrodomesticos");
/// assert_eq!(slugify("Shun de  Andrômeda"), "shun-de-andromeda");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for ch in title
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
    {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        } else if is_separator(ch) {
            pending_separator = true;
        }
    }

    slug
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || ch == '-' || ch == '_'
}
