//! Entities shared across the resolve, assemble, plan, and render stages.
//!
//! They are built once per generation run and never mutated afterwards.

use serde::Serialize;
use std::path::PathBuf;

/// One row of the catalog `authors` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    /// Used in `author--{slug}.html`.
    pub slug: String,
}

/// A catalog book joined with its resolved author and series chain.
#[derive(Debug, Clone, Serialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub slug: String,
    /// Position within its leaf series, when the catalog has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_index: Option<f64>,
    /// `<catalog_root>/<book.path>/cover.jpg`; existence is not checked here.
    pub cover_source: PathBuf,
    /// `None` when the book has no author link or the link dangles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    /// Full chain of hierarchy node names, root first. Each name is a key
    /// into [`SeriesRegistry`](crate::hierarchy::SeriesRegistry).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<String>,
}

impl Book {
    /// Whether any node of this book's series chain is named `name`.
    pub fn in_series(&self, name: &str) -> bool {
        self.series.iter().any(|s| s == name)
    }

    /// Whether this book's author is named `name`.
    pub fn by_author(&self, name: &str) -> bool {
        self.author.as_ref().is_some_and(|a| a.name == name)
    }
}
