//! Shared test utilities for the shelfmark test suite.
//!
//! Provides a catalog row builder, lookup helpers, and a series forest shape
//! assertion that work with assembled [`Library`] data.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let rows = CatalogBuilder::new()
//!     .author(1, "Jane Doe")
//!     .series(1, "Mythos.Book One")
//!     .book(1, "Title", Some(1.0), "path1")
//!     .author_link(1, 1)
//!     .series_link(1, 1)
//!     .build();
//! let library = library_from(&rows);
//!
//! let book = find_book(&library, "Title");
//! assert_eq!(book.series, vec!["Mythos", "Book One"]);
//!
//! assert_forest_shape(&library, &[("Mythos", &["Book One"])]);
//! ```

use std::path::Path;

use crate::catalog::{AuthorLinkRow, AuthorRow, BookRow, CatalogRows, SeriesLinkRow, SeriesRow};
use crate::config::SiteConfig;
use crate::hierarchy::SeriesNode;
use crate::library::{AssembleOptions, Library};
use crate::types::Book;

// =========================================================================
// Catalog rows
// =========================================================================

/// Fluent builder for [`CatalogRows`]; rows keep insertion order.
#[derive(Default)]
pub struct CatalogBuilder {
    rows: CatalogRows,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn author(mut self, id: i64, name: &str) -> Self {
        self.rows.authors.push(AuthorRow {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn series(mut self, id: i64, name: &str) -> Self {
        self.rows.series.push(SeriesRow {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn book(mut self, id: i64, title: &str, series_index: Option<f64>, path: &str) -> Self {
        self.rows.books.push(BookRow {
            id,
            title: title.to_string(),
            series_index,
            path: path.to_string(),
        });
        self
    }

    pub fn author_link(mut self, book: i64, author: i64) -> Self {
        self.rows.author_links.push(AuthorLinkRow { book, author });
        self
    }

    pub fn series_link(mut self, book: i64, series: i64) -> Self {
        self.rows.series_links.push(SeriesLinkRow { book, series });
        self
    }

    pub fn build(self) -> CatalogRows {
        self.rows
    }
}

/// The single-book catalog used across module tests.
pub fn mythos_catalog() -> CatalogRows {
    CatalogBuilder::new()
        .author(1, "Jane Doe")
        .series(1, "Mythos.Book One")
        .book(1, "Title", Some(1.0), "path1")
        .author_link(1, 1)
        .series_link(1, 1)
        .build()
}

/// Assemble rows with stock config, catalog root `/catalog`.
pub fn library_from(rows: &CatalogRows) -> Library {
    let config = SiteConfig::default();
    let options = AssembleOptions::from_site_config(&config, Path::new("/catalog"));
    Library::assemble(rows, &options)
}

// =========================================================================
// Library lookups — panics with a clear message on miss
// =========================================================================

/// Find a book by title. Panics if not found.
pub fn find_book<'a>(library: &'a Library, title: &str) -> &'a Book {
    library
        .books
        .iter()
        .find(|b| b.title == title)
        .unwrap_or_else(|| {
            let titles = book_titles(&library.books.iter().collect::<Vec<_>>());
            panic!("book '{title}' not found. Available: {titles:?}")
        })
}

/// Find a series node by name. Panics if not found.
pub fn find_series<'a>(library: &'a Library, name: &str) -> &'a SeriesNode {
    library.series.get(name).unwrap_or_else(|| {
        let names: Vec<&str> = library.series.nodes().map(|n| n.name.as_str()).collect();
        panic!("series '{name}' not found. Available: {names:?}")
    })
}

/// Titles of a book list, in list order.
pub fn book_titles<'a>(books: &[&'a Book]) -> Vec<&'a str> {
    books.iter().map(|b| b.title.as_str()).collect()
}

// =========================================================================
// Series forest helpers
// =========================================================================

/// Assert that the forest roots and their direct children match.
///
/// Each entry is `(root, children)`. Use `&[]` for roots without children.
pub fn assert_forest_shape(library: &Library, expected: &[(&str, &[&str])]) {
    let roots: Vec<&str> = library.series.roots().map(|n| n.name.as_str()).collect();
    let expected_roots: Vec<&str> = expected.iter().map(|(r, _)| *r).collect();
    assert_eq!(roots, expected_roots, "series roots mismatch");

    for (root, children) in expected {
        let node = find_series(library, root);
        let actual: Vec<&str> = library
            .series
            .children(node)
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(actual, children.to_vec(), "children of '{root}' mismatch");
    }
}
