//! Centralized name handling for catalog entities.
//!
//! Every page name, sort key, and hierarchy path in the site is derived from
//! free-form catalog text. This module keeps those derivations in one place so
//! the resolver, the assembler, and the planner agree on them:
//!
//! - [`slugify`]: `"Jane Doe"` → `"jane-doe"`, used in output file names
//! - [`sort_title`]: `"The Hobbit"` → `"hobbit"`, the title comparison key
//! - [`split_series_name`]: `"Mythos.Book One"` → `["Mythos", "Book One"]`

use std::cmp::Ordering;

/// Leading articles stripped from the title comparison key. Only one is
/// removed, and only when followed by a space.
const LEADING_ARTICLES: &[&str] = &["a ", "an ", "the "];

/// Generate a URL/file-safe slug from display text.
///
/// Transliterates to ASCII, lowercases, turns whitespace, dashes, and
/// underscores into single dashes, and drops every other character.
///
/// - `"Jane Doe"` → `"jane-doe"`
/// - `"Book One"` → `"book-one"`
/// - `"O'Brien, Patrick"` → `"obrien-patrick"`
/// - `"Brontë Sisters"` → `"bronte-sisters"`
pub fn slugify(text: &str) -> String {
    let ascii = deunicode::deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    slug
}

/// Title comparison key: lowercased, with a single leading article removed.
///
/// The stored title and slug are never touched; this key is only used to
/// order book lists.
pub fn sort_title(title: &str) -> String {
    let lower = title.to_lowercase();
    for article in LEADING_ARTICLES {
        if let Some(rest) = lower.strip_prefix(article) {
            return rest.to_string();
        }
    }
    lower
}

/// Three-way title comparison on [`sort_title`] keys.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    sort_title(a).cmp(&sort_title(b))
}

/// Split a catalog series name into its hierarchy segments.
///
/// `"Discworld.City Watch"` → `["Discworld", "City Watch"]`. A name without
/// the delimiter is a single-segment chain.
pub fn split_series_name(name: &str, delimiter: &str) -> Vec<String> {
    name.split(delimiter).map(str::to_string).collect()
}
