//! CLI output formatting for the scan and build commands.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity (author,
//! series, book) leads with its positional index and name; catalog paths and
//! output files are secondary context, shown as indented lines or after `→`.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Authors
//! 001 Jane Doe (1 book)
//!
//! Series
//! 001 Mythos (1 book)
//!     001 Book One (1 book)
//!
//! Books
//! 001 Title
//!     Author: Jane Doe
//!     Series: Mythos › Book One #1
//!     Cover: calibre/path1/cover.jpg
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html (1 book)
//!
//! Authors
//! 001 Jane Doe → author--jane-doe.html (1 book)
//!
//! Series
//! 001 Mythos → series--mythos.html (1 book)
//! 002 Book One → series--book-one.html (1 book)
//!
//! Generated 4 pages, 1 cover
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use std::collections::HashSet;

use crate::emit::{GroupReport, Phase};
use crate::hierarchy::{SeriesNode, SeriesRegistry};
use crate::library::Library;
use crate::naming::compare_titles;
use crate::pipeline::{BuildReport, PlannedPage};
use crate::resolve::ResolveStats;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

/// Format an entity header: positional index + name, with optional book count.
///
/// ```text
/// 001 Jane Doe (3 books)
/// 001 The Hobbit
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), title, plural(n, "book")),
        None => format!("{} {}", format_index(index), title),
    }
}

// ============================================================================
// Series tree walker
// ============================================================================

/// A flattened series node with its depth and sibling position.
struct TreeNode<'a> {
    depth: usize,
    position: usize,
    node: &'a SeriesNode,
}

/// Walk the series forest depth-first, assigning positions per sibling level.
fn walk_series_tree(series: &SeriesRegistry) -> Vec<TreeNode<'_>> {
    let mut nodes = Vec::new();
    walk_series_recursive(series, series.roots(), 0, &mut nodes);
    nodes
}

fn walk_series_recursive<'a>(
    series: &'a SeriesRegistry,
    items: impl Iterator<Item = &'a SeriesNode>,
    depth: usize,
    nodes: &mut Vec<TreeNode<'a>>,
) {
    for (i, node) in items.enumerate() {
        nodes.push(TreeNode {
            depth,
            position: i + 1,
            node,
        });
        walk_series_recursive(series, series.children(node), depth + 1, nodes);
    }
}

fn link_warnings(stats: &ResolveStats) -> Vec<String> {
    let counts = [
        (stats.dangling_author_links, "dangling author link"),
        (stats.dangling_series_links, "dangling series link"),
        (stats.collapsed_author_links, "book with several authors"),
        (stats.collapsed_series_links, "book with several series"),
    ];
    counts
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, label)| format!("    {}", plural(n, label)))
        .collect()
}

// ============================================================================
// Scan output
// ============================================================================

/// Format the resolved library as an inventory, without writing anything.
pub fn format_scan_output(library: &Library) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Authors".to_string());
    for (i, author) in library.author_list().into_iter().enumerate() {
        let count = library.books.iter().filter(|b| b.by_author(&author.name)).count();
        lines.push(entity_header(i + 1, &author.name, Some(count)));
    }

    lines.push(String::new());
    lines.push("Series".to_string());
    for tree_node in walk_series_tree(&library.series) {
        let name = &tree_node.node.name;
        let count = library.books.iter().filter(|b| b.in_series(name)).count();
        lines.push(format!(
            "{}{}",
            indent(tree_node.depth),
            entity_header(tree_node.position, name, Some(count))
        ));
    }

    lines.push(String::new());
    lines.push("Books".to_string());
    let mut books: Vec<_> = library.books.iter().collect();
    books.sort_by(|a, b| compare_titles(&a.title, &b.title));
    for (i, book) in books.into_iter().enumerate() {
        lines.push(entity_header(i + 1, &book.title, None));
        if let Some(author) = &book.author {
            lines.push(format!("    Author: {}", author.name));
        }
        if !book.series.is_empty() {
            let chain = book.series.join(" › ");
            match book.series_index {
                Some(index) => lines.push(format!("    Series: {} #{}", chain, index)),
                None => lines.push(format!("    Series: {}", chain)),
            }
        }
        lines.push(format!("    Cover: {}", book.cover_source.display()));
    }

    let warnings = link_warnings(&library.stats);
    if !warnings.is_empty() {
        lines.push(String::new());
        lines.push("Links".to_string());
        lines.extend(warnings);
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(library: &Library) {
    for line in format_scan_output(library) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format build output: every planned page with its book count, then totals.
///
/// Pages tolerated as failures under `on_error = "skip"` are marked
/// `(skipped)` instead of showing a book count.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();
    let skipped: HashSet<&str> = report
        .page_groups
        .iter()
        .flat_map(|g| g.skipped_files.iter().map(String::as_str))
        .collect();
    let detail = |page: &PlannedPage| {
        if skipped.contains(page.file_name.as_str()) {
            "skipped".to_string()
        } else {
            plural(page.books, "book")
        }
    };

    for page in report.pages.iter().filter(|p| p.phase == Phase::Index) {
        lines.push(format!("Home \u{2192} {} ({})", page.file_name, detail(page)));
    }

    let sections = [
        ("Authors", &[Phase::Authors][..]),
        ("Series", &[Phase::ContainerSeries, Phase::LeafSeries][..]),
    ];
    for (title, phases) in sections {
        let pages: Vec<_> = report
            .pages
            .iter()
            .filter(|p| phases.contains(&p.phase))
            .collect();
        if pages.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(title.to_string());
        for (i, page) in pages.into_iter().enumerate() {
            lines.push(format!(
                "{} {} \u{2192} {} ({})",
                format_index(i + 1),
                page.heading,
                page.file_name,
                detail(page)
            ));
        }
    }

    let warnings = link_warnings(&report.stats);
    if !warnings.is_empty() {
        lines.push(String::new());
        lines.push("Links".to_string());
        lines.extend(warnings);
    }

    lines.push(String::new());
    lines.push(summary_line(&report.covers, &report.page_groups));
    lines
}

fn summary_line(covers: &GroupReport, page_groups: &[GroupReport]) -> String {
    let pages: usize = page_groups.iter().map(|g| g.written).sum();
    let skipped: usize = covers.skipped + page_groups.iter().map(|g| g.skipped).sum::<usize>();
    let mut line = format!(
        "Generated {}, {}",
        plural(pages, "page"),
        plural(covers.written, "cover")
    );
    if skipped > 0 {
        line.push_str(&format!(" ({} skipped)", skipped));
    }
    line
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::planned_pages;
    use crate::plan::plan;
    use crate::test_helpers::*;
    use std::path::PathBuf;

    #[test]
    fn format_index_single_digit() {
        assert_eq!(format_index(1), "001");
    }

    #[test]
    fn format_index_double_digit() {
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn format_index_triple_digit() {
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(1), "    ");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn entity_header_with_count() {
        assert_eq!(entity_header(1, "Jane Doe", Some(3)), "001 Jane Doe (3 books)");
        assert_eq!(entity_header(2, "Solo", Some(1)), "002 Solo (1 book)");
    }

    #[test]
    fn entity_header_without_count() {
        assert_eq!(entity_header(1, "The Hobbit", None), "001 The Hobbit");
    }

    #[test]
    fn scan_output_lists_authors_series_and_books() {
        let library = library_from(&mythos_catalog());
        let lines = format_scan_output(&library);
        assert_eq!(
            lines,
            vec![
                "Authors",
                "001 Jane Doe (1 book)",
                "",
                "Series",
                "001 Mythos (1 book)",
                "    001 Book One (1 book)",
                "",
                "Books",
                "001 Title",
                "    Author: Jane Doe",
                "    Series: Mythos › Book One #1",
                "    Cover: /catalog/path1/cover.jpg",
            ]
        );
    }

    #[test]
    fn scan_output_reports_dangling_links() {
        let rows = CatalogBuilder::new()
            .book(1, "Orphan", None, "p")
            .author_link(1, 99)
            .build();
        let library = library_from(&rows);
        let lines = format_scan_output(&library);
        assert_eq!(lines[lines.len() - 2], "Links");
        assert_eq!(lines[lines.len() - 1], "    1 dangling author link");
    }

    fn report_for(library: &Library) -> BuildReport {
        let plan = plan(library);
        let group = |phase, total| GroupReport {
            phase,
            total,
            written: total,
            skipped: 0,
            skipped_files: Vec::new(),
        };
        BuildReport {
            output_dir: PathBuf::from("docs"),
            books: library.books.len(),
            authors: library.authors.len(),
            series: library.series.len(),
            stats: library.stats,
            covers: group(Phase::Covers, library.books.len()),
            page_groups: vec![
                group(Phase::Index, 1),
                group(Phase::Authors, plan.authors.len()),
                group(Phase::ContainerSeries, plan.containers.len()),
                group(Phase::LeafSeries, plan.leaves.len()),
            ],
            pages: planned_pages(&plan),
        }
    }

    #[test]
    fn build_output_lists_pages_and_totals() {
        let library = library_from(&mythos_catalog());
        let lines = format_build_output(&report_for(&library));
        assert_eq!(
            lines,
            vec![
                "Home → index.html (1 book)",
                "",
                "Authors",
                "001 Jane Doe → author--jane-doe.html (1 book)",
                "",
                "Series",
                "001 Mythos → series--mythos.html (1 book)",
                "002 Book One → series--book-one.html (1 book)",
                "",
                "Generated 4 pages, 1 cover",
            ]
        );
    }

    #[test]
    fn build_output_marks_skipped_pages() {
        let library = library_from(&mythos_catalog());
        let mut report = report_for(&library);
        let authors = &mut report.page_groups[1];
        authors.written = 0;
        authors.skipped = 1;
        authors.skipped_files = vec!["author--jane-doe.html".to_string()];

        let lines = format_build_output(&report);
        assert!(lines.contains(&"001 Jane Doe → author--jane-doe.html (skipped)".to_string()));
        assert!(lines.contains(&"001 Mythos → series--mythos.html (1 book)".to_string()));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Generated 3 pages, 1 cover (1 skipped)")
        );
    }

    #[test]
    fn build_summary_mentions_skipped_items() {
        let covers = GroupReport {
            phase: Phase::Covers,
            total: 3,
            written: 2,
            skipped: 1,
            skipped_files: vec!["3.jpg".to_string()],
        };
        let index = GroupReport {
            phase: Phase::Index,
            total: 1,
            written: 1,
            skipped: 0,
            skipped_files: Vec::new(),
        };
        assert_eq!(
            summary_line(&covers, &[index]),
            "Generated 1 page, 2 covers (1 skipped)"
        );
    }
}
