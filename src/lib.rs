//! # Shelfmark
//!
//! A static site generator for Calibre e-book libraries. The Calibre
//! `metadata.db` is the data source: authors, series, and books become a
//! browsable set of cross-linked HTML pages, with every cover copied next to
//! them.
//!
//! # Architecture: One-Shot Pipeline
//!
//! A run reads the catalog once, builds an immutable in-memory library, and
//! writes the site:
//!
//! ```text
//! 1. Read       metadata.db  →  CatalogRows     (five table snapshots)
//! 2. Assemble   CatalogRows  →  Library         (resolve links, series forest, books)
//! 3. Plan       Library      →  Plan            (which pages exist, which books each lists)
//! 4. Emit       Plan         →  docs/           (covers, then pages, group by group)
//! ```
//!
//! Steps 2 and 3 are pure functions over owned data, so nearly all of the
//! catalog semantics are unit-tested without a database or a filesystem.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Read-only SQLite access, one snapshot per table |
//! | [`resolve`] | Id → entity tables, link collapsing, dangling-link accounting |
//! | [`hierarchy`] | Series names split into a forest of container and leaf nodes |
//! | [`library`] | Joins book rows with their author, series chain, and cover path |
//! | [`plan`] | Index, author, and series views with their orderings |
//! | [`render`] | Maud templates behind the [`render::PageRenderer`] seam |
//! | [`emit`] | Cooperative fan-out of cover copies and page writes |
//! | [`pipeline`] | One full run, end to end |
//! | [`config`] | `shelfmark.toml` loading, validation, and color CSS |
//! | [`types`] | The assembled `Author` and `Book` records |
//! | [`naming`] | Slugs, sort titles, and series-name splitting |
//! | [`output`] | CLI output formatting for `scan` and `build` |
//!
//! # Design Decisions
//!
//! ## Hierarchical Series From Flat Names
//!
//! Calibre has one flat series per book. A delimiter in the name (`.` by
//! default) turns `Discworld.City Watch` into a container `Discworld` with a
//! leaf `City Watch`. Container pages aggregate everything beneath them;
//! leaf pages list books in reading order.
//!
//! ## Read Everything, Then Write
//!
//! The catalog is fully loaded before the first file is touched. A locked or
//! missing database aborts the run with the output directory untouched.
//!
//! ## Single-Threaded Fan-Out
//!
//! Writes run as tasks on a current-thread tokio runtime. Each group awaits
//! every one of its items before the next group starts, so a failure never
//! leaves a half-started group behind.

pub mod catalog;
pub mod config;
pub mod emit;
pub mod hierarchy;
pub mod library;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod plan;
pub mod render;
pub mod resolve;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
