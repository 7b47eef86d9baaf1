//! Entity resolution from normalized catalog rows.
//!
//! Turns the flat tables of a [`CatalogRows`] snapshot into registries and
//! per-book associations:
//!
//! - `authors`: author id → [`Author`]
//! - `series_chains`: series row id → segment names
//! - `series`: the [`SeriesRegistry`] holding one node per segment
//! - `author_links`: book id → [`Author`]
//! - `series_links`: book id → segment names of its series row
//!
//! ## Link reduction
//!
//! The catalog allows several author or series links per book. Links are
//! first collected as multi-valued [`Associations`], in row order, then
//! reduced with [`Associations::last_wins`]: the last link row for a book
//! decides its association. A last row that dangles (its author or series id
//! has no row) leaves the book without an association even if an earlier
//! row resolved.
//!
//! Dangling ids are never errors. They are counted in [`ResolveStats`].

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::catalog::CatalogRows;
use crate::hierarchy::SeriesRegistry;
use crate::naming::{slugify, split_series_name};
use crate::types::Author;

/// Multi-valued book → value links, kept in link-row order.
///
/// `None` entries record link rows whose target id did not resolve.
#[derive(Debug, Clone)]
pub struct Associations<T> {
    links: HashMap<i64, Vec<Option<T>>>,
}

impl<T> Default for Associations<T> {
    fn default() -> Self {
        Self {
            links: HashMap::new(),
        }
    }
}

impl<T: Clone> Associations<T> {
    pub fn push(&mut self, book: i64, value: Option<T>) {
        self.links.entry(book).or_default().push(value);
    }

    /// Every link recorded for `book`, resolved or not.
    #[cfg(test)]
    fn all(&self, book: i64) -> &[Option<T>] {
        self.links.get(&book).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of books with more than one link row.
    pub fn collapsed(&self) -> usize {
        self.links.values().filter(|v| v.len() > 1).count()
    }

    /// Reduce to one value per book: the last link row wins.
    pub fn last_wins(&self) -> HashMap<i64, T> {
        self.links
            .iter()
            .filter_map(|(&book, values)| {
                values
                    .last()
                    .and_then(|v| v.clone())
                    .map(|value| (book, value))
            })
            .collect()
    }
}

/// Counters describing how cleanly the link tables resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolveStats {
    pub dangling_author_links: usize,
    pub dangling_series_links: usize,
    /// Books with several author-link rows, reduced to the last one.
    pub collapsed_author_links: usize,
    /// Books with several series-link rows, reduced to the last one.
    pub collapsed_series_links: usize,
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub authors: BTreeMap<i64, Author>,
    pub series_chains: HashMap<i64, Vec<String>>,
    /// Nodes only; the forest is built later by the assembler.
    pub series: SeriesRegistry,
    pub author_links: HashMap<i64, Author>,
    pub series_links: HashMap<i64, Vec<String>>,
    pub stats: ResolveStats,
}

pub fn resolve(rows: &CatalogRows, delimiter: &str) -> Resolved {
    let authors: BTreeMap<i64, Author> = rows
        .authors
        .iter()
        .map(|row| {
            let author = Author {
                id: row.id,
                name: row.name.clone(),
                slug: slugify(&row.name),
            };
            (row.id, author)
        })
        .collect();

    let mut series_chains = HashMap::new();
    let mut series = SeriesRegistry::new();
    for row in &rows.series {
        let chain = split_series_name(&row.name, delimiter);
        series.insert_chain(&chain);
        series_chains.insert(row.id, chain);
    }

    let mut stats = ResolveStats::default();

    let mut author_assoc = Associations::default();
    for link in &rows.author_links {
        let author = authors.get(&link.author).cloned();
        if author.is_none() {
            stats.dangling_author_links += 1;
            tracing::debug!(book = link.book, author = link.author, "dangling author link");
        }
        author_assoc.push(link.book, author);
    }

    let mut series_assoc = Associations::default();
    for link in &rows.series_links {
        let chain = series_chains.get(&link.series).cloned();
        if chain.is_none() {
            stats.dangling_series_links += 1;
            tracing::debug!(book = link.book, series = link.series, "dangling series link");
        }
        series_assoc.push(link.book, chain);
    }

    stats.collapsed_author_links = author_assoc.collapsed();
    stats.collapsed_series_links = series_assoc.collapsed();

    if stats.dangling_author_links + stats.dangling_series_links > 0 {
        tracing::warn!(
            authors = stats.dangling_author_links,
            series = stats.dangling_series_links,
            "link rows reference missing catalog rows"
        );
    }

    Resolved {
        authors,
        series_chains,
        series,
        author_links: author_assoc.last_wins(),
        series_links: series_assoc.last_wins(),
        stats,
    }
}
