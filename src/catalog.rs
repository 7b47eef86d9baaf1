//! Read-only access to the library catalog.
//!
//! The catalog is a Calibre-style SQLite database. A generation run reads it
//! exactly once, in full, before any entity is built:
//!
//! ```text
//! authors(id, name)
//! series(id, name)                  -- name may hold delimited hierarchy segments
//! books_authors_link(book, author)
//! books_series_link(book, series)
//! books(id, title, series_index, path)
//! ```
//!
//! Everything downstream works on the [`CatalogRows`] snapshot, so unit tests
//! build rows directly and never touch SQLite.

use serde::Serialize;
use sqlx::FromRow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog not found: {0}")]
    NotFound(PathBuf),
    #[error("Catalog query failed: {0}")]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct AuthorRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SeriesRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct AuthorLinkRow {
    pub book: i64,
    pub author: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SeriesLinkRow {
    pub book: i64,
    pub series: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct BookRow {
    pub id: i64,
    pub title: String,
    pub series_index: Option<f64>,
    /// Book folder, relative to the catalog root.
    pub path: String,
}

/// Every row the generator needs, read in one pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogRows {
    pub authors: Vec<AuthorRow>,
    pub series: Vec<SeriesRow>,
    pub author_links: Vec<AuthorLinkRow>,
    pub series_links: Vec<SeriesLinkRow>,
    pub books: Vec<BookRow>,
}

/// Open the catalog database read-only and read every table the generator uses.
///
/// The queries run one after another; the resolver needs all of them before
/// it can start.
pub async fn read_catalog(db_path: &Path) -> Result<CatalogRows, CatalogError> {
    if !db_path.is_file() {
        return Err(CatalogError::NotFound(db_path.to_path_buf()));
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true)
        .create_if_missing(false);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    let rows = read_rows(&pool).await;
    pool.close().await;
    let rows = rows?;

    tracing::info!(
        authors = rows.authors.len(),
        series = rows.series.len(),
        books = rows.books.len(),
        "read catalog {}",
        db_path.display()
    );
    Ok(rows)
}

async fn read_rows(pool: &SqlitePool) -> Result<CatalogRows, CatalogError> {
    let authors = sqlx::query_as::<_, AuthorRow>("SELECT id, name FROM authors")
        .fetch_all(pool)
        .await?;
    let series = sqlx::query_as::<_, SeriesRow>("SELECT id, name FROM series")
        .fetch_all(pool)
        .await?;
    let author_links =
        sqlx::query_as::<_, AuthorLinkRow>("SELECT book, author FROM books_authors_link")
            .fetch_all(pool)
            .await?;
    let series_links =
        sqlx::query_as::<_, SeriesLinkRow>("SELECT book, series FROM books_series_link")
            .fetch_all(pool)
            .await?;
    let books =
        sqlx::query_as::<_, BookRow>("SELECT id, title, series_index, path FROM books")
            .fetch_all(pool)
            .await?;

    Ok(CatalogRows {
        authors,
        series,
        author_links,
        series_links,
        books,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_database_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("metadata.db");
        let err = read_catalog(&path).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(p) if p == path));
    }

    #[tokio::test]
    async fn database_without_tables_fails_to_query() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("metadata.db");
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.unwrap();
        pool.close().await;

        let err = read_catalog(&path).await.unwrap_err();
        assert!(matches!(err, CatalogError::Sqlx(_)));
    }
}
