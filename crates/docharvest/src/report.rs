//! Run reports: the full document set and a reduced summary

use crate::error::HarvestError;
use crate::types::{HarvestedDocument, RunResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Reduced view of a harvested document for quick inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub node_name: String,
    pub title: Option<String>,
    pub file_name: Option<String>,
    pub path: String,
    pub anchor_count: usize,
    pub anchors: Vec<Option<String>>,
}

impl From<&HarvestedDocument> for DocumentSummary {
    fn from(doc: &HarvestedDocument) -> Self {
        Self {
            node_name: doc.task.name.clone(),
            title: doc.document.title.clone(),
            file_name: doc.document.file_name.clone(),
            path: doc.task.path.clone(),
            anchor_count: doc.document.anchors.len(),
            anchors: doc
                .document
                .anchors
                .iter()
                .map(|a| a.title.clone())
                .collect(),
        }
    }
}

/// Full record list and summary list of a run
pub fn summarize(result: &RunResult) -> (&[HarvestedDocument], Vec<DocumentSummary>) {
    let summary = result.documents.iter().map(DocumentSummary::from).collect();
    (&result.documents, summary)
}

/// Write the full and summary reports as indented JSON
pub fn write_reports(
    result: &RunResult,
    documents_file: &Path,
    summary_file: &Path,
) -> Result<(), HarvestError> {
    let (documents, summary) = summarize(result);
    write_json(documents_file, &documents)?;
    write_json(summary_file, &summary)?;
    Ok(())
}

/// Load a full report written by [`write_reports`]
pub fn load_documents(path: &Path) -> Result<Vec<HarvestedDocument>, HarvestError> {
    let raw = std::fs::read_to_string(path).map_err(|source| HarvestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| HarvestError::InvalidDocuments {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), HarvestError> {
    let json = serde_json::to_string_pretty(value).map_err(HarvestError::Serialize)?;
    let write_err = |source| HarvestError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, json).map_err(write_err)
}
