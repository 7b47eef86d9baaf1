//! Book assembly and the in-memory library snapshot.
//!
//! [`Library::assemble`] runs the whole in-memory stage on a catalog
//! snapshot: resolve entities, build the series forest, then join every book
//! row with its resolved author and series chain. The resulting [`Library`]
//! is immutable and shared by reference with the planner, the emitter, and
//! the renderer for the rest of the run.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::catalog::{BookRow, CatalogRows};
use crate::config::SiteConfig;
use crate::hierarchy::SeriesRegistry;
use crate::naming::slugify;
use crate::resolve::{self, ResolveStats};
use crate::types::{Author, Book};

/// Inputs to assembly that come from configuration rather than the catalog.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Directory that book `path` values are relative to.
    pub catalog_root: PathBuf,
    /// Cover file name inside each book folder.
    pub cover_name: String,
    /// Series name segment delimiter.
    pub delimiter: String,
}

impl AssembleOptions {
    pub fn from_site_config(config: &SiteConfig, catalog_root: &Path) -> Self {
        Self {
            catalog_root: catalog_root.to_path_buf(),
            cover_name: config.covers.source_name.clone(),
            delimiter: config.series.delimiter.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Library {
    /// Keyed by catalog author id.
    pub authors: BTreeMap<i64, Author>,
    pub series: SeriesRegistry,
    /// In catalog row order.
    pub books: Vec<Book>,
    pub stats: ResolveStats,
}

impl Library {
    pub fn assemble(rows: &CatalogRows, options: &AssembleOptions) -> Self {
        let resolved = resolve::resolve(rows, &options.delimiter);
        let mut series = resolved.series;
        series.build_forest();

        let books = assemble_books(
            &rows.books,
            &resolved.author_links,
            &resolved.series_links,
            options,
        );

        tracing::debug!(
            authors = resolved.authors.len(),
            series = series.len(),
            books = books.len(),
            "library assembled"
        );

        Self {
            authors: resolved.authors,
            series,
            books,
            stats: resolved.stats,
        }
    }

    /// Authors in catalog id order.
    pub fn author_list(&self) -> Vec<&Author> {
        self.authors.values().collect()
    }
}

/// Join book rows with their reduced author and series associations.
pub fn assemble_books(
    rows: &[BookRow],
    author_links: &HashMap<i64, Author>,
    series_links: &HashMap<i64, Vec<String>>,
    options: &AssembleOptions,
) -> Vec<Book> {
    rows.iter()
        .map(|row| Book {
            id: row.id,
            title: row.title.clone(),
            slug: slugify(&row.title),
            series_index: row.series_index,
            cover_source: options
                .catalog_root
                .join(&row.path)
                .join(&options.cover_name),
            author: author_links.get(&row.id).cloned(),
            series: series_links.get(&row.id).cloned().unwrap_or_default(),
        })
        .collect()
}
