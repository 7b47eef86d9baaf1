//! HTML page rendering.
//!
//! Rendering is a pure function from page data to markup: it reads the
//! library snapshot and never mutates it. The [`PageRenderer`] trait is the
//! seam between the emitter and the template, so emitter tests can swap in a
//! renderer that records or fails.
//!
//! Every page has the same layout:
//!
//! - **Header**: site title linking back to `index.html`
//! - **Navigation**: every author, then the series forest as nested lists
//! - **Book list**: `<ol>` for leaf-series pages (with series indices),
//!   `<ul>` everywhere else
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All interpolated catalog text is escaped.

use maud::{DOCTYPE, Markup, html};
use thiserror::Error;

use crate::config::{self, SiteConfig};
use crate::hierarchy::{SeriesNode, SeriesRegistry};
use crate::plan::ViewKey;
use crate::types::{Author, Book};

const CSS_STATIC: &str = include_str!("../static/style.css");

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to render {page}: {message}")]
    Template { page: String, message: String },
}

/// Everything a page template may read.
#[derive(Debug, Clone, Copy)]
pub struct PageData<'a> {
    /// Output file name, e.g. `author--jane-doe.html`.
    pub page: &'a str,
    pub heading: &'a str,
    pub books: &'a [&'a Book],
    pub authors: &'a [&'a Author],
    pub series: &'a SeriesRegistry,
    /// Render the list as a numbered sequence with series indices.
    pub ordered: bool,
}

pub trait PageRenderer {
    fn render(&self, page: &PageData<'_>) -> Result<String, RenderError>;
}

/// The production renderer.
pub struct HtmlRenderer {
    site_title: String,
    covers_dir: String,
    css: String,
}

impl HtmlRenderer {
    pub fn new(config: &SiteConfig) -> Self {
        let color_css = config::generate_color_css(&config.colors);
        Self {
            site_title: config.site.title.clone(),
            covers_dir: config.covers.dir.clone(),
            css: format!("{}\n\n{}", color_css, CSS_STATIC),
        }
    }
}

impl PageRenderer for HtmlRenderer {
    fn render(&self, page: &PageData<'_>) -> Result<String, RenderError> {
        Ok(self.render_page(page).into_string())
    }
}

impl HtmlRenderer {
    fn render_page(&self, page: &PageData<'_>) -> Markup {
        let title = if page.page == ViewKey::Index.file_name() {
            self.site_title.clone()
        } else {
            format!("{} - {}", page.heading, self.site_title)
        };

        let content = html! {
            (site_header(&self.site_title))
            div.layout {
                (render_nav(page.authors, page.series))
                main.books {
                    h1 { (page.heading) }
                    (self.render_book_list(page))
                }
            }
        };

        base_document(&title, &self.css, content)
    }

    fn render_book_list(&self, page: &PageData<'_>) -> Markup {
        html! {
            @if page.ordered {
                ol.book-list.ordered {
                    @for book in page.books {
                        (self.render_book(book, page.series, true))
                    }
                }
            } @else {
                ul.book-list {
                    @for book in page.books {
                        (self.render_book(book, page.series, false))
                    }
                }
            }
        }
    }

    fn render_book(&self, book: &Book, series: &SeriesRegistry, ordered: bool) -> Markup {
        let chain = series.resolve_chain(&book.series);
        html! {
            li.book {
                img.cover src={ (self.covers_dir) "/" (book.id) ".jpg" } alt=(book.title) loading="lazy";
                div.book-info {
                    @if ordered {
                        @if let Some(index) = book.series_index {
                            span.series-index { "#" (index) }
                        }
                    }
                    span.book-title { (book.title) }
                    @if let Some(author) = &book.author {
                        a.book-author href=(ViewKey::Author(author.slug.clone()).file_name()) {
                            (author.name)
                        }
                    }
                    @if !chain.is_empty() {
                        span.book-series {
                            @for (i, node) in chain.iter().enumerate() {
                                @if i > 0 { " › " }
                                (series_link(node))
                            }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (css) }
            }
            body {
                (content)
            }
        }
    }
}

fn site_header(site_title: &str) -> Markup {
    html! {
        header.site-header {
            a href=(ViewKey::Index.file_name()) { (site_title) }
        }
    }
}

/// Renders the author list and the series forest
fn render_nav(authors: &[&Author], series: &SeriesRegistry) -> Markup {
    html! {
        nav.site-nav {
            h2 { "Authors" }
            ul.author-list {
                @for author in authors {
                    li {
                        a href=(ViewKey::Author(author.slug.clone()).file_name()) { (author.name) }
                    }
                }
            }
            h2 { "Series" }
            ul.series-tree {
                @for root in series.roots() {
                    (render_series_item(series, root))
                }
            }
        }
    }
}

/// Renders one series node and, recursively, its children
fn render_series_item(series: &SeriesRegistry, node: &SeriesNode) -> Markup {
    html! {
        li {
            (series_link(node))
            @if !node.children.is_empty() {
                ul {
                    @for child in series.children(node) {
                        (render_series_item(series, child))
                    }
                }
            }
        }
    }
}

fn series_link(node: &SeriesNode) -> Markup {
    html! {
        a href=(ViewKey::Series(node.slug.clone()).file_name()) { (node.name) }
    }
}

// ============================================================================
// Tests
// ============================================================================
