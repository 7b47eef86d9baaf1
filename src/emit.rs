//! Page and cover emission.
//!
//! The last stage of a generation run. All work here is file I/O, grouped
//! into fan-outs that run in a fixed order:
//!
//! ```text
//! covers     copy <catalog_root>/<book.path>/cover.jpg → <output>/covers/<id>.jpg
//! index      index.html
//! authors    author--<slug>.html, one per author
//! containers series--<slug>.html, one per non-leaf series node
//! leaves     series--<slug>.html, one per leaf series node
//! ```
//!
//! Items inside a group are launched together on the runtime and finish in
//! any order; each one writes a distinct path. A group is awaited to the end
//! before the next one starts, so no operation is left pending when a run
//! stops.
//!
//! ## Failure policy
//!
//! A failed item (unreadable cover, failed render, failed write) never
//! cancels its siblings. What happens once the group has settled depends on
//! [`FailurePolicy`]:
//!
//! - `Fail`: the group returns [`EmitError::GroupFailed`] and the run stops.
//! - `Skip`: each failure is logged and counted in the [`GroupReport`].

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};

use crate::config::FailurePolicy;
use crate::library::Library;
use crate::plan::{Plan, View};
use crate::render::{PageData, PageRenderer, RenderError};

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{phase}: {failed} of {total} items failed, first: {first}")]
    GroupFailed {
        phase: Phase,
        failed: usize,
        total: usize,
        first: Box<ItemError>,
    },
}

/// Failure of a single fan-out item.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("task aborted: {0}")]
    Task(#[from] JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Covers,
    Index,
    Authors,
    ContainerSeries,
    LeafSeries,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Covers => "covers",
            Phase::Index => "index",
            Phase::Authors => "author pages",
            Phase::ContainerSeries => "container series pages",
            Phase::LeafSeries => "leaf series pages",
        };
        f.write_str(label)
    }
}

/// Outcome of one settled fan-out group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    pub phase: Phase,
    pub total: usize,
    pub written: usize,
    /// Failed items tolerated under [`FailurePolicy::Skip`].
    pub skipped: usize,
    /// Output file names of the skipped items, sorted. A task that aborted
    /// before reporting is counted but not named.
    pub skipped_files: Vec<String>,
}

/// A failed item and, when known, the output file it was meant to produce.
#[derive(Debug)]
struct Failure {
    file: Option<String>,
    error: ItemError,
}

/// One unit of fan-out work, owning everything it touches.
#[derive(Debug)]
enum Job {
    Copy { from: PathBuf, to: PathBuf },
    Write { to: PathBuf, contents: String },
}

impl Job {
    /// File name of the output this job produces.
    fn file_name(&self) -> String {
        let to = match self {
            Job::Copy { to, .. } | Job::Write { to, .. } => to,
        };
        to.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    async fn run(self) -> Result<(), ItemError> {
        match self {
            Job::Copy { from, to } => match tokio::fs::copy(&from, &to).await {
                Ok(_) => Ok(()),
                Err(source) => Err(ItemError::Io { path: from, source }),
            },
            Job::Write { to, contents } => match tokio::fs::write(&to, contents).await {
                Ok(()) => Ok(()),
                Err(source) => Err(ItemError::Io { path: to, source }),
            },
        }
    }
}

/// Launch every job, wait for all of them, then apply the failure policy.
///
/// `failures` holds items that already failed before any I/O (render errors);
/// they count toward the group total.
async fn fan_out(
    phase: Phase,
    jobs: Vec<Job>,
    mut failures: Vec<Failure>,
    policy: FailurePolicy,
) -> Result<GroupReport, EmitError> {
    let total = jobs.len() + failures.len();
    let mut set = JoinSet::new();
    for job in jobs {
        let file = job.file_name();
        set.spawn(async move { (file, job.run().await) });
    }

    let mut written = 0;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((_, Ok(()))) => written += 1,
            Ok((file, Err(error))) => failures.push(Failure {
                file: Some(file),
                error,
            }),
            Err(aborted) => failures.push(Failure {
                file: None,
                error: aborted.into(),
            }),
        }
    }

    for failure in &failures {
        let err = &failure.error;
        match policy {
            FailurePolicy::Skip => tracing::warn!(%phase, "skipped: {err}"),
            FailurePolicy::Fail => tracing::error!(%phase, "failed: {err}"),
        }
    }

    if policy == FailurePolicy::Fail && !failures.is_empty() {
        let failed = failures.len();
        return Err(EmitError::GroupFailed {
            phase,
            failed,
            total,
            first: Box::new(failures.swap_remove(0).error),
        });
    }

    let mut skipped_files: Vec<String> = failures.iter().filter_map(|f| f.file.clone()).collect();
    skipped_files.sort();

    tracing::info!(%phase, written, skipped = failures.len(), "group complete");
    Ok(GroupReport {
        phase,
        total,
        written,
        skipped: failures.len(),
        skipped_files,
    })
}

/// Copy every book's cover to `<covers_dir>/<book id>.jpg`.
pub async fn copy_covers(
    library: &Library,
    covers_dir: &Path,
    policy: FailurePolicy,
) -> Result<GroupReport, EmitError> {
    tokio::fs::create_dir_all(covers_dir).await?;
    let jobs = library
        .books
        .iter()
        .map(|book| Job::Copy {
            from: book.cover_source.clone(),
            to: covers_dir.join(format!("{}.jpg", book.id)),
        })
        .collect();
    fan_out(Phase::Covers, jobs, Vec::new(), policy).await
}

/// Render and write every planned page, one group at a time.
///
/// Returns the reports of all groups. Under [`FailurePolicy::Fail`] the first
/// failed group ends the run and later groups are not started.
pub async fn write_pages(
    library: &Library,
    plan: &Plan<'_>,
    renderer: &impl PageRenderer,
    output_dir: &Path,
    policy: FailurePolicy,
) -> Result<Vec<GroupReport>, EmitError> {
    tokio::fs::create_dir_all(output_dir).await?;
    let authors = library.author_list();

    let groups: [(Phase, Vec<&View<'_>>); 4] = [
        (Phase::Index, vec![&plan.index]),
        (Phase::Authors, plan.authors.iter().collect()),
        (Phase::ContainerSeries, plan.containers.iter().collect()),
        (Phase::LeafSeries, plan.leaves.iter().collect()),
    ];

    let mut reports = Vec::with_capacity(groups.len());
    for (phase, views) in groups {
        let mut jobs = Vec::with_capacity(views.len());
        let mut failures = Vec::new();
        for view in views {
            let page = view.key.file_name();
            let data = PageData {
                page: &page,
                heading: &view.heading,
                books: &view.books,
                authors: &authors,
                series: &library.series,
                ordered: view.ordered(),
            };
            match renderer.render(&data) {
                Ok(contents) => {
                    tracing::debug!(%phase, page = %page, books = view.books.len(), "rendered");
                    jobs.push(Job::Write {
                        to: output_dir.join(&page),
                        contents,
                    });
                }
                Err(err) => failures.push(Failure {
                    file: Some(page.clone()),
                    error: err.into(),
                }),
            }
        }
        reports.push(fan_out(phase, jobs, failures, policy).await?);
    }
    Ok(reports)
}
