//! One generation run, end to end.
//!
//! ```text
//! read catalog → resolve + assemble → copy covers → plan views → write pages
//! ```
//!
//! The catalog is read once, up front; nothing is written until the library
//! has been assembled, so an unavailable catalog leaves the output untouched.

use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::{self, CatalogError};
use crate::config::SiteConfig;
use crate::emit::{self, EmitError, GroupReport, Phase};
use crate::library::{AssembleOptions, Library};
use crate::plan::{self, Plan};
use crate::render::PageRenderer;
use crate::resolve::ResolveStats;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Emit error: {0}")]
    Emit(#[from] EmitError),
}

/// A page that was planned for this run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPage {
    pub phase: Phase,
    pub heading: String,
    pub file_name: String,
    pub books: usize,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    pub books: usize,
    pub authors: usize,
    pub series: usize,
    pub stats: ResolveStats,
    pub covers: GroupReport,
    pub page_groups: Vec<GroupReport>,
    pub pages: Vec<PlannedPage>,
}

/// Read the catalog named by `config` and assemble the library.
pub async fn load_library(config: &SiteConfig) -> Result<Library, CatalogError> {
    let rows = catalog::read_catalog(&config.database_path()).await?;
    let options = AssembleOptions::from_site_config(config, &config.catalog_root);
    Ok(Library::assemble(&rows, &options))
}

/// Run a full generation: covers first, then every page group.
pub async fn build(
    config: &SiteConfig,
    renderer: &impl PageRenderer,
) -> Result<BuildReport, BuildError> {
    let library = load_library(config).await?;
    let policy = config.emit.on_error;

    tracing::info!("copying covers to {}", config.covers_dir().display());
    let covers = emit::copy_covers(&library, &config.covers_dir(), policy).await?;

    let plan = plan::plan(&library);
    tracing::info!(pages = plan.page_count(), "writing pages");
    let page_groups =
        emit::write_pages(&library, &plan, renderer, &config.output_dir, policy).await?;

    Ok(BuildReport {
        output_dir: config.output_dir.clone(),
        books: library.books.len(),
        authors: library.authors.len(),
        series: library.series.len(),
        stats: library.stats,
        covers,
        page_groups,
        pages: planned_pages(&plan),
    })
}

/// Flatten a plan into page summaries, in emission order.
pub fn planned_pages(plan: &Plan<'_>) -> Vec<PlannedPage> {
    let groups = [
        (Phase::Index, std::slice::from_ref(&plan.index)),
        (Phase::Authors, plan.authors.as_slice()),
        (Phase::ContainerSeries, plan.containers.as_slice()),
        (Phase::LeafSeries, plan.leaves.as_slice()),
    ];
    groups
        .into_iter()
        .flat_map(|(phase, views)| {
            views.iter().map(move |view| PlannedPage {
                phase,
                heading: view.heading.clone(),
                file_name: view.key.file_name(),
                books: view.books.len(),
            })
        })
        .collect()
}
