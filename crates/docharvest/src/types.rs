//! Core types for DocHarvest

use serde::{Deserialize, Deserializer, Serialize};

/// Node of the category index
///
/// Read-only input. Node identifiers appear as strings or numbers depending
/// on the catalog, so both are accepted and normalized to strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    /// Display name (not guaranteed unique)
    #[serde(default, deserialize_with = "string_or_number")]
    pub node_name: Option<String>,

    /// External document reference
    #[serde(default, deserialize_with = "string_or_number")]
    pub relate_document: Option<String>,

    /// Internal node identifier
    #[serde(default, deserialize_with = "string_or_number")]
    pub node_id: Option<String>,

    /// Leaf flag (informational)
    #[serde(default)]
    pub is_leaf: Option<bool>,

    /// Child nodes, in display order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Create a node with the given display name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            node_name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set the document reference
    pub fn document(mut self, reference: impl Into<String>) -> Self {
        self.relate_document = Some(reference.into());
        self
    }

    /// Set the node identifier
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.node_id = Some(id.into());
        self
    }

    /// Append a child node
    pub fn child(mut self, child: CategoryNode) -> Self {
        self.children.push(child);
        self
    }

    /// Display name, empty when absent
    pub fn name(&self) -> &str {
        self.node_name.as_deref().unwrap_or("")
    }

    /// Document reference, empty when absent
    pub fn reference(&self) -> &str {
        self.relate_document.as_deref().unwrap_or("")
    }
}

/// One unit of work: a document to fetch and where to persist it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchTask {
    /// Display name of the originating node
    #[serde(rename = "nodeName")]
    pub name: String,

    /// Document reference passed to the fetcher
    #[serde(rename = "relateDocument")]
    pub document_ref: String,

    /// Internal node identifier, empty when absent
    #[serde(default, deserialize_with = "string_or_number_or_empty")]
    pub node_id: String,

    /// Derived hierarchical path, `/`-separated, without extension
    pub path: String,

    /// Leaf flag
    #[serde(default = "default_true")]
    pub is_leaf: bool,
}

/// Anchor (section) entry of a fetched document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// Anchor title
    #[serde(default)]
    pub title: Option<String>,
}

/// Body wrapper as delivered by the document service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentContent {
    /// Raw HTML body
    #[serde(default)]
    pub content: Option<String>,
}

/// Document returned by a successful fetch
///
/// Every field is optional; renderers fall back to "Untitled" for a missing
/// title, "Unknown" for a missing anchor title, and skip absent sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedDocument {
    /// Canonical document identifier
    #[serde(default, deserialize_with = "string_or_number")]
    pub doc_id: Option<String>,

    /// Document title
    #[serde(default)]
    pub title: Option<String>,

    /// Canonical file name (display only)
    #[serde(default)]
    pub file_name: Option<String>,

    /// Anchors, in document order
    #[serde(default, rename = "anchorList", deserialize_with = "null_as_empty")]
    pub anchors: Vec<Anchor>,

    /// Body wrapper
    #[serde(default)]
    pub content: Option<DocumentContent>,
}

impl FetchedDocument {
    /// Raw HTML body, if present and non-empty
    pub fn body(&self) -> Option<&str> {
        self.content
            .as_ref()
            .and_then(|c| c.content.as_deref())
            .filter(|body| !body.is_empty())
    }
}

/// A fetched document merged with the tree metadata of its task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestedDocument {
    #[serde(flatten)]
    pub document: FetchedDocument,

    #[serde(flatten)]
    pub task: FetchTask,
}

/// Request sent to a [`DocumentFetcher`](crate::DocumentFetcher)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    /// Document reference
    pub object_id: String,

    /// Document version, always empty for the latest
    pub version: String,

    /// Catalog the document belongs to
    pub catalog_name: String,

    /// Language code
    pub language: String,
}

impl DocumentRequest {
    /// Create a request for the latest version of a document
    pub fn new(
        object_id: impl Into<String>,
        catalog_name: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            version: String::new(),
            catalog_name: catalog_name.into(),
            language: language.into(),
        }
    }
}

/// Aggregate outcome of one harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    /// Number of tasks considered
    pub total: usize,
    /// Documents fetched successfully
    pub successful: usize,
    /// Fetches that failed
    pub failed: usize,
    /// Tasks skipped because their output already existed
    pub skipped: usize,
    /// Markdown files written
    pub saved: usize,
    /// Successfully fetched documents, in task order
    #[serde(skip)]
    pub documents: Vec<HarvestedDocument>,
}

fn default_true() -> bool {
    true
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Str(s)) => Some(s),
        Some(Raw::Int(n)) => Some(n.to_string()),
        Some(Raw::Float(n)) => Some(n.to_string()),
        Some(Raw::Bool(b)) => Some(b.to_string()),
        None => None,
    })
}

fn string_or_number_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or_number(deserializer)?.unwrap_or_default())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
