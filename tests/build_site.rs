//! End-to-end runs against a real SQLite catalog on disk.

use shelfmark::config::{FailurePolicy, SiteConfig};
use shelfmark::emit::{EmitError, Phase};
use shelfmark::pipeline::{self, BuildError};
use shelfmark::render::HtmlRenderer;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SCHEMA: &[&str] = &[
    "CREATE TABLE authors (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
    "CREATE TABLE series (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
    "CREATE TABLE books (id INTEGER PRIMARY KEY, title TEXT NOT NULL, series_index REAL, path TEXT NOT NULL)",
    "CREATE TABLE books_authors_link (id INTEGER PRIMARY KEY, book INTEGER NOT NULL, author INTEGER NOT NULL)",
    "CREATE TABLE books_series_link (id INTEGER PRIMARY KEY, book INTEGER NOT NULL, series INTEGER NOT NULL)",
];

/// Create `metadata.db` under `root` and run `statements` against it.
async fn write_catalog(root: &Path, statements: &[&str]) {
    fs::create_dir_all(root).unwrap();
    let options = SqliteConnectOptions::new()
        .filename(root.join("metadata.db"))
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    for sql in SCHEMA.iter().chain(statements) {
        sqlx::query(sql).execute(&pool).await.unwrap();
    }
    pool.close().await;
}

fn write_cover(root: &Path, book_path: &str, bytes: &[u8]) {
    let dir = root.join(book_path);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("cover.jpg"), bytes).unwrap();
}

fn config_for(tmp: &TempDir) -> SiteConfig {
    let mut config = SiteConfig::default();
    config.catalog_root = tmp.path().join("calibre");
    config.output_dir = tmp.path().join("docs");
    config
}

#[tokio::test]
async fn builds_site_from_mythos_catalog() {
    let tmp = TempDir::new().unwrap();
    let config = config_for(&tmp);
    write_catalog(
        &config.catalog_root,
        &[
            "INSERT INTO authors VALUES (1, 'Jane Doe')",
            "INSERT INTO series VALUES (1, 'Mythos.Book One')",
            "INSERT INTO books VALUES (1, 'Title', 1.0, 'path1')",
            "INSERT INTO books_authors_link (book, author) VALUES (1, 1)",
            "INSERT INTO books_series_link (book, series) VALUES (1, 1)",
        ],
    )
    .await;
    write_cover(&config.catalog_root, "path1", b"jpeg bytes");

    let renderer = HtmlRenderer::new(&config);
    let report = pipeline::build(&config, &renderer).await.unwrap();

    let out = &config.output_dir;
    for page in [
        "index.html",
        "author--jane-doe.html",
        "series--mythos.html",
        "series--book-one.html",
    ] {
        assert!(out.join(page).is_file(), "{page} not written");
    }
    assert_eq!(fs::read(out.join("covers/1.jpg")).unwrap(), b"jpeg bytes");

    assert_eq!(report.books, 1);
    assert_eq!(report.series, 2);
    assert_eq!(report.pages.len(), 4);
    assert_eq!(report.covers.written, 1);

    let leaf = fs::read_to_string(out.join("series--book-one.html")).unwrap();
    assert!(leaf.contains("<h1>Book One</h1>"));
    assert!(leaf.contains(r#"src="covers/1.jpg""#));
    assert!(leaf.contains(r#"href="author--jane-doe.html""#));

    let container = fs::read_to_string(out.join("series--mythos.html")).unwrap();
    assert!(container.contains("Title"));
}

#[tokio::test]
async fn dangling_links_are_dropped_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let config = config_for(&tmp);
    write_catalog(
        &config.catalog_root,
        &[
            "INSERT INTO authors VALUES (1, 'Jane Doe')",
            "INSERT INTO books VALUES (1, 'Linked', NULL, 'a')",
            "INSERT INTO books VALUES (2, 'Orphan', NULL, 'b')",
            "INSERT INTO books_authors_link (book, author) VALUES (1, 1)",
            "INSERT INTO books_authors_link (book, author) VALUES (2, 42)",
            "INSERT INTO books_series_link (book, series) VALUES (2, 7)",
        ],
    )
    .await;
    write_cover(&config.catalog_root, "a", b"a");
    write_cover(&config.catalog_root, "b", b"b");

    let renderer = HtmlRenderer::new(&config);
    let report = pipeline::build(&config, &renderer).await.unwrap();

    assert_eq!(report.stats.dangling_author_links, 1);
    assert_eq!(report.stats.dangling_series_links, 1);
    assert_eq!(report.series, 0);

    let author = fs::read_to_string(config.output_dir.join("author--jane-doe.html")).unwrap();
    assert!(author.contains("Linked"));
    assert!(!author.contains("Orphan"));

    let index = fs::read_to_string(config.output_dir.join("index.html")).unwrap();
    assert!(index.contains("Orphan"));
}

#[tokio::test]
async fn missing_cover_stops_run_before_pages() {
    let tmp = TempDir::new().unwrap();
    let config = config_for(&tmp);
    write_catalog(
        &config.catalog_root,
        &["INSERT INTO books VALUES (1, 'No Cover', NULL, 'nowhere')"],
    )
    .await;

    let renderer = HtmlRenderer::new(&config);
    let err = pipeline::build(&config, &renderer).await.unwrap_err();

    match err {
        BuildError::Emit(EmitError::GroupFailed { phase, failed, .. }) => {
            assert_eq!(phase, Phase::Covers);
            assert_eq!(failed, 1);
        }
        other => panic!("expected cover group failure, got {other:?}"),
    }
    assert!(!config.output_dir.join("index.html").exists());
}

#[tokio::test]
async fn skip_policy_writes_pages_despite_missing_cover() {
    let tmp = TempDir::new().unwrap();
    let mut config = config_for(&tmp);
    config.emit.on_error = FailurePolicy::Skip;
    write_catalog(
        &config.catalog_root,
        &["INSERT INTO books VALUES (1, 'No Cover', NULL, 'nowhere')"],
    )
    .await;

    let renderer = HtmlRenderer::new(&config);
    let report = pipeline::build(&config, &renderer).await.unwrap();

    assert_eq!(report.covers.skipped, 1);
    assert!(config.output_dir.join("index.html").is_file());
}

#[tokio::test]
async fn scan_reads_library_without_writing() {
    let tmp = TempDir::new().unwrap();
    let config = config_for(&tmp);
    write_catalog(
        &config.catalog_root,
        &[
            "INSERT INTO series VALUES (1, 'Discworld.City Watch')",
            "INSERT INTO books VALUES (1, 'Guards! Guards!', 1.0, 'gg')",
            "INSERT INTO books_series_link (book, series) VALUES (1, 1)",
        ],
    )
    .await;

    let library = pipeline::load_library(&config).await.unwrap();

    assert_eq!(library.books.len(), 1);
    assert_eq!(library.books[0].series, vec!["Discworld", "City Watch"]);
    assert_eq!(
        library.books[0].cover_source,
        config.catalog_root.join("gg").join("cover.jpg")
    );
    assert!(!config.output_dir.exists());
}
