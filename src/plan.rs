//! View planning: which pages exist and which books each one lists.
//!
//! Every page is a [`View`]: an output key, a filtered book list, and an
//! ordering. Four groups are planned from one [`Library`]:
//!
//! | Group | Books | Order |
//! |-------|-------|-------|
//! | index | all books | sort title |
//! | author | books whose author has the same name | sort title |
//! | container series | books with the node anywhere in their chain | sort title |
//! | leaf series | books with the node anywhere in their chain | series index |
//!
//! All lists are filtered from one title-sorted list, so the leaf-series sort
//! (stable) keeps title order among books with equal series indices.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::hierarchy::SeriesNode;
use crate::library::Library;
use crate::naming::compare_titles;
use crate::types::{Author, Book};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewKey {
    Index,
    /// Author slug.
    Author(String),
    /// Series node slug.
    Series(String),
}

impl ViewKey {
    /// Output file name relative to the output directory.
    pub fn file_name(&self) -> String {
        match self {
            ViewKey::Index => "index.html".to_string(),
            ViewKey::Author(slug) => format!("author--{slug}.html"),
            ViewKey::Series(slug) => format!("series--{slug}.html"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookOrder {
    /// By [`sort_title`](crate::naming::sort_title).
    BySortTitle,
    /// By series index ascending; books without an index come last.
    BySeriesIndex,
}

#[derive(Debug, Clone)]
pub struct View<'a> {
    pub key: ViewKey,
    /// Page heading, e.g. the author or series name.
    pub heading: String,
    pub books: Vec<&'a Book>,
    pub order: BookOrder,
}

impl View<'_> {
    /// Whether the list should render as a numbered sequence.
    pub fn ordered(&self) -> bool {
        self.order == BookOrder::BySeriesIndex
    }
}

/// Every view of one run, grouped the way the emitter fans them out.
#[derive(Debug, Clone)]
pub struct Plan<'a> {
    pub index: View<'a>,
    pub authors: Vec<View<'a>>,
    pub containers: Vec<View<'a>>,
    pub leaves: Vec<View<'a>>,
}

impl<'a> Plan<'a> {
    pub fn views(&self) -> impl Iterator<Item = &View<'a>> {
        std::iter::once(&self.index)
            .chain(&self.authors)
            .chain(&self.containers)
            .chain(&self.leaves)
    }

    /// Number of pages; the index page is always planned.
    pub fn page_count(&self) -> usize {
        1 + self.authors.len() + self.containers.len() + self.leaves.len()
    }
}

pub fn plan(library: &Library) -> Plan<'_> {
    let sorted = books_by_title(&library.books);

    let index = View {
        key: ViewKey::Index,
        heading: "All books".to_string(),
        books: sorted.clone(),
        order: BookOrder::BySortTitle,
    };

    let authors = keep_last_per_file(
        library
            .authors
            .values()
            .map(|author| author_view(author, &sorted))
            .collect(),
    );

    let (leaf_nodes, container_nodes): (Vec<&SeriesNode>, Vec<&SeriesNode>) =
        library.series.nodes().partition(|n| n.leaf);
    let containers: Vec<View<'_>> = keep_last_per_file(
        container_nodes
            .into_iter()
            .map(|node| series_view(node, &sorted))
            .collect(),
    );
    let leaves = keep_last_per_file(
        leaf_nodes
            .into_iter()
            .map(|node| series_view(node, &sorted))
            .collect(),
    );

    // Leaf pages are written after container pages and replace them.
    let container_keys: HashSet<&ViewKey> = containers.iter().map(|v| &v.key).collect();
    for leaf in leaves.iter().filter(|v| container_keys.contains(&v.key)) {
        tracing::warn!(
            page = %leaf.key.file_name(),
            series = %leaf.heading,
            "leaf series page replaces a container page with the same slug"
        );
    }

    Plan {
        index,
        authors,
        containers,
        leaves,
    }
}

/// Keep one view per output file within a group: the last one planned.
///
/// Distinct names can share a slug ("Jane Doe", "jane doe"); their pages
/// would race for the same path inside one fan-out.
fn keep_last_per_file(views: Vec<View<'_>>) -> Vec<View<'_>> {
    let mut seen = HashSet::new();
    let mut kept: Vec<View<'_>> = views
        .into_iter()
        .rev()
        .filter(|view| {
            let first = seen.insert(view.key.clone());
            if !first {
                tracing::warn!(
                    page = %view.key.file_name(),
                    dropped = %view.heading,
                    "slug collision, a later entry keeps the page"
                );
            }
            first
        })
        .collect();
    kept.reverse();
    kept
}

/// All books, sorted by title comparison key.
pub fn books_by_title(books: &[Book]) -> Vec<&Book> {
    let mut sorted: Vec<&Book> = books.iter().collect();
    sorted.sort_by(|a, b| compare_titles(&a.title, &b.title));
    sorted
}

fn author_view<'a>(author: &Author, sorted: &[&'a Book]) -> View<'a> {
    View {
        key: ViewKey::Author(author.slug.clone()),
        heading: author.name.clone(),
        books: sorted
            .iter()
            .copied()
            .filter(|b| b.by_author(&author.name))
            .collect(),
        order: BookOrder::BySortTitle,
    }
}

fn series_view<'a>(node: &SeriesNode, sorted: &[&'a Book]) -> View<'a> {
    let mut books: Vec<&Book> = sorted
        .iter()
        .copied()
        .filter(|b| b.in_series(&node.name))
        .collect();
    let order = if node.leaf {
        books.sort_by(|a, b| compare_series_index(a.series_index, b.series_index));
        BookOrder::BySeriesIndex
    } else {
        BookOrder::BySortTitle
    };
    View {
        key: ViewKey::Series(node.slug.clone()),
        heading: node.name.clone(),
        books,
        order,
    }
}

fn compare_series_index(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
