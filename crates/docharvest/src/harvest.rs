//! Sequential fetch orchestration
//!
//! Design: one task at a time, in tree order. A task either is skipped
//! (output already present), fails (counted and logged), or succeeds and is
//! written. Nothing a single task does can abort the run.

use crate::client::DocumentFetcher;
use crate::scan::output_path;
use crate::types::{DocumentRequest, FetchTask, HarvestedDocument, RunResult};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-run orchestration settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Where markdown files go; `None` disables writing
    pub output_root: Option<PathBuf>,
    /// Catalog passed with every request
    pub catalog: String,
    /// Language passed with every request
    pub language: String,
    /// Pause between consecutive network calls
    pub delay: Duration,
}

/// What happened to one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Output already existed, no request made
    Skipped,
    /// Fetched; writing is disabled for this run
    Fetched,
    /// Fetched and written to disk
    Saved(PathBuf),
    /// Fetch failed
    FetchFailed(String),
    /// Fetched but the file could not be written
    WriteFailed(String),
}

/// Progress report emitted after each task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskProgress {
    /// 1-based position of the task
    pub index: usize,
    /// Number of tasks in the run
    pub total: usize,
    /// Display name of the task
    pub name: String,
    /// Document reference of the task
    pub document_ref: String,
    /// Result of the task
    pub outcome: TaskOutcome,
}

/// Process `tasks` in order and collect the results
///
/// `existing` holds the task paths to skip. `render` turns a fetched
/// document into the markdown written under `options.output_root`.
/// `progress` is called once per task, after it has been handled.
pub async fn run<R, P>(
    tasks: &[FetchTask],
    existing: &HashSet<String>,
    fetcher: &dyn DocumentFetcher,
    render: R,
    options: &RunOptions,
    mut progress: P,
) -> RunResult
where
    R: Fn(&HarvestedDocument) -> String,
    P: FnMut(TaskProgress),
{
    let total = tasks.len();
    let mut result = RunResult {
        total,
        ..Default::default()
    };
    let mut requested_before = false;

    info!(total, skip = existing.len(), fetcher = fetcher.name(), "Starting harvest");

    for (i, task) in tasks.iter().enumerate() {
        let outcome = if existing.contains(&task.path) {
            debug!(path = %task.path, "Output exists, skipping");
            result.skipped += 1;
            TaskOutcome::Skipped
        } else {
            if requested_before && !options.delay.is_zero() {
                tokio::time::sleep(options.delay).await;
            }
            requested_before = true;

            let request =
                DocumentRequest::new(&task.document_ref, &options.catalog, &options.language);
            match fetcher.fetch(&request).await {
                Ok(document) => {
                    result.successful += 1;
                    let harvested = HarvestedDocument {
                        document,
                        task: task.clone(),
                    };
                    let outcome = match &options.output_root {
                        Some(root) => {
                            let outcome = save(root, &harvested, &render).await;
                            if matches!(outcome, TaskOutcome::Saved(_)) {
                                result.saved += 1;
                            }
                            outcome
                        }
                        None => TaskOutcome::Fetched,
                    };
                    result.documents.push(harvested);
                    outcome
                }
                Err(e) => {
                    warn!(
                        name = %task.name,
                        document = %task.document_ref,
                        transport = e.is_transport(),
                        error = %e,
                        "Fetch failed"
                    );
                    result.failed += 1;
                    TaskOutcome::FetchFailed(e.to_string())
                }
            }
        };

        progress(TaskProgress {
            index: i + 1,
            total,
            name: task.name.clone(),
            document_ref: task.document_ref.clone(),
            outcome,
        });
    }

    info!(
        total = result.total,
        successful = result.successful,
        skipped = result.skipped,
        failed = result.failed,
        saved = result.saved,
        "Harvest finished"
    );

    result
}

async fn save<R>(root: &std::path::Path, doc: &HarvestedDocument, render: &R) -> TaskOutcome
where
    R: Fn(&HarvestedDocument) -> String,
{
    let path = output_path(root, &doc.task);
    let markdown = render(doc);

    if let Some(parent) = path.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            warn!(path = %path.display(), error = %e, "Failed to create directory");
            return TaskOutcome::WriteFailed(e.to_string());
        }
    }

    match tokio::fs::write(&path, markdown).await {
        Ok(()) => {
            debug!(path = %path.display(), "Saved document");
            TaskOutcome::Saved(path)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to write document");
            TaskOutcome::WriteFailed(e.to_string())
        }
    }
}
