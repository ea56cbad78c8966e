//! End-to-end entry points
//!
//! Ties the pieces together: load the index, flatten it, look for existing
//! outputs, run the orchestrator and write the reports.

use crate::client::{DocumentFetcher, PortalClient};
use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::harvest::{run, RunOptions, TaskProgress};
use crate::render::{render_document, Labels};
use crate::report::write_reports;
use crate::scan::{output_path, scan};
use crate::tree::{flatten, load_category_index};
use crate::types::{FetchTask, HarvestedDocument, RunResult};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Harvest with the HTTP document client built from `config.api`
pub async fn harvest<P>(config: &HarvestConfig, progress: P) -> Result<RunResult, HarvestError>
where
    P: FnMut(TaskProgress),
{
    config.validate()?;
    let client = PortalClient::new(config.api.clone())?;
    harvest_with(config, &client, progress).await
}

/// Harvest with a caller-provided document fetcher
pub async fn harvest_with<P>(
    config: &HarvestConfig,
    fetcher: &dyn DocumentFetcher,
    progress: P,
) -> Result<RunResult, HarvestError>
where
    P: FnMut(TaskProgress),
{
    config.validate()?;

    let roots = load_category_index(&config.input)?;
    let tasks = flatten(&roots);
    info!(count = tasks.len(), input = %config.input.display(), "Extracted documents");

    // Computed once, before anything is written
    let existing = if config.skip_existing && config.save_markdown {
        scan(&tasks, &config.output_dir)
    } else {
        HashSet::new()
    };
    if !existing.is_empty() {
        info!(count = existing.len(), "Found previously harvested documents");
    }

    let labels = Labels::for_language(&config.language);
    let options = RunOptions {
        output_root: config.save_markdown.then(|| config.output_dir.clone()),
        catalog: config.catalog.clone(),
        language: config.language.clone(),
        delay: config.delay,
    };

    let result = run(
        &tasks,
        &existing,
        fetcher,
        |doc| render_document(doc, &labels),
        &options,
        progress,
    )
    .await;

    write_reports(&result, &config.documents_file, &config.summary_file)?;
    info!(
        documents = %config.documents_file.display(),
        summary = %config.summary_file.display(),
        "Reports written"
    );

    Ok(result)
}

/// Counts from [`rebuild_markdown`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildStats {
    pub total: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Regenerate markdown files from previously harvested documents
///
/// Uses the same path layout as a harvest run and makes no network calls.
///
/// Only documents present in `documents` can be rebuilt. A resumed harvest
/// rewrites the documents file with the documents fetched by that run alone,
/// so files saved by earlier runs are not covered by it.
pub fn rebuild_markdown(
    documents: &[HarvestedDocument],
    output_dir: &Path,
    labels: &Labels,
    skip_existing: bool,
) -> RebuildStats {
    let tasks: Vec<FetchTask> = documents.iter().map(|doc| doc.task.clone()).collect();
    let existing = if skip_existing {
        scan(&tasks, output_dir)
    } else {
        HashSet::new()
    };

    let mut stats = RebuildStats {
        total: documents.len(),
        ..Default::default()
    };

    for doc in documents {
        if existing.contains(&doc.task.path) {
            stats.skipped += 1;
            continue;
        }

        let path = output_path(output_dir, &doc.task);
        let written = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| std::fs::write(&path, render_document(doc, labels)));
        match written {
            Ok(()) => stats.written += 1,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to write document");
                stats.failed += 1;
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::report::load_documents;
    use crate::types::FetchedDocument;

    fn doc(path: &str) -> HarvestedDocument {
        HarvestedDocument {
            document: FetchedDocument {
                title: Some(path.to_string()),
                ..Default::default()
            },
            task: FetchTask {
                name: path.to_string(),
                document_ref: path.to_string(),
                path: path.to_string(),
                is_leaf: true,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_rebuild_markdown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.md"), "kept").unwrap();
        let docs = vec![doc("A"), doc("B/C")];

        let stats = rebuild_markdown(&docs, dir.path(), &Labels::ENGLISH, true);
        assert_eq!(
            stats,
            RebuildStats {
                total: 2,
                written: 1,
                skipped: 1,
                failed: 0
            }
        );
        assert_eq!(std::fs::read_to_string(dir.path().join("A.md")).unwrap(), "kept");
        assert!(std::fs::read_to_string(dir.path().join("B/C.md"))
            .unwrap()
            .starts_with("# B/C\n"));

        let stats = rebuild_markdown(&docs, dir.path(), &Labels::ENGLISH, false);
        assert_eq!(stats.written, 2);
        assert!(std::fs::read_to_string(dir.path().join("A.md"))
            .unwrap()
            .starts_with("# A\n"));
    }

    #[tokio::test]
    async fn test_harvest_missing_index_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarvestConfig::builder()
            .input(dir.path().join("missing.json"))
            .build();

        let result = harvest(&config, |_| {}).await;
        assert!(matches!(result, Err(HarvestError::IndexNotFound(_))));
    }

    #[tokio::test]
    async fn test_harvest_invalid_endpoint_is_fatal() {
        let config = HarvestConfig::builder().endpoint("not a url").build();
        let result = harvest(&config, |_| {}).await;
        assert!(matches!(result, Err(HarvestError::Client(_))));
    }

    #[tokio::test]
    async fn test_harvest_invalid_user_agent_is_fatal() {
        let config = HarvestConfig::builder().user_agent("bad\r\nagent").build();
        let result = harvest(&config, |_| {}).await;
        assert!(matches!(
            result,
            Err(HarvestError::Client(FetchError::RequestError(_)))
        ));
    }

    #[tokio::test]
    async fn test_harvest_empty_index_writes_empty_reports() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("category.json");
        std::fs::write(&input, "[]").unwrap();
        let config = HarvestConfig::builder()
            .input(&input)
            .output_dir(dir.path().join("docs"))
            .documents_file(dir.path().join("documents.json"))
            .summary_file(dir.path().join("documents_summary.json"))
            .endpoint("http://127.0.0.1:9/unused")
            .build();

        let result = harvest(&config, |_| {}).await.unwrap();
        assert_eq!(result.total, 0);
        assert!(load_documents(&config.documents_file).unwrap().is_empty());
    }
}
