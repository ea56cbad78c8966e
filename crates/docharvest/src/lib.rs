//! DocHarvest - documentation portal harvesting library
//!
//! Walks a category index, fetches every referenced document from the
//! documentation service, converts the HTML body to Markdown and writes one
//! file per document into a directory tree mirroring the category structure.
//!
//! ## Pipeline
//!
//! 1. [`load_category_index`] reads the category tree
//! 2. [`flatten`] turns it into an ordered list of [`FetchTask`]s
//! 3. [`scan`] finds tasks whose output already exists
//! 4. [`run`] fetches the rest through a [`DocumentFetcher`], one at a time
//! 5. [`write_reports`] stores the full and summary JSON reports
//!
//! [`harvest`] does all of the above from a [`HarvestConfig`].
//!
//! Re-running over a partially populated output directory resumes where the
//! previous run stopped: a task is skipped when its markdown file exists.

pub mod client;
pub mod config;
mod convert;
mod error;
pub mod harvest;
mod pipeline;
pub mod render;
pub mod report;
mod sanitize;
mod scan;
pub mod tree;
mod types;

pub use client::{ApiConfig, DocumentFetcher, PortalClient};
pub use config::{HarvestConfig, HarvestConfigBuilder};
pub use convert::html_to_markdown;
pub use error::{ConvertError, FetchError, HarvestError};
pub use harvest::{run, RunOptions, TaskOutcome, TaskProgress};
pub use pipeline::{harvest, harvest_with, rebuild_markdown, RebuildStats};
pub use render::{render_document, Labels};
pub use report::{load_documents, write_reports, DocumentSummary};
pub use sanitize::sanitize;
pub use scan::{output_path, scan};
pub use tree::{flatten, load_category_index, render_tree};
pub use types::{
    Anchor, CategoryNode, DocumentContent, DocumentRequest, FetchTask, FetchedDocument,
    HarvestedDocument, RunResult,
};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
