//! Category tree loading and flattening
//!
//! The walker turns the category index into an ordered list of
//! [`FetchTask`]s. Each task path is built from the sanitized names of the
//! node and all of its named ancestors, so an unchanged tree always yields
//! byte-identical paths. Resuming a run relies on that.

use crate::error::HarvestError;
use crate::sanitize::sanitize;
use crate::types::{CategoryNode, FetchTask};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

/// Segment used when a named node sanitizes to nothing usable and has no id
const UNTITLED_SEGMENT: &str = "untitled";

/// Read and parse a category index file
pub fn load_category_index(path: &Path) -> Result<Vec<CategoryNode>, HarvestError> {
    let raw = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            HarvestError::IndexNotFound(path.to_path_buf())
        } else {
            HarvestError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_str(&raw).map_err(|source| HarvestError::InvalidIndex {
        path: path.to_path_buf(),
        source,
    })
}

/// Flatten the tree into fetch tasks, pre-order
///
/// Only nodes with both a name and a document reference become tasks;
/// structural nodes are walked for their children. Unnamed nodes do not add
/// a path segment, so their children attach to the grandparent's path.
///
/// When an emitted task would reuse a path already claimed by an earlier
/// task, the segment is suffixed with `~<node id>` (or `~2`, `~3`, ...) and
/// the node's children follow the suffixed path.
pub fn flatten(roots: &[CategoryNode]) -> Vec<FetchTask> {
    let mut tasks = Vec::new();
    let mut claimed: HashSet<String> = HashSet::new();
    let mut stack: Vec<(&CategoryNode, String)> =
        roots.iter().rev().map(|node| (node, String::new())).collect();

    while let Some((node, parent_path)) = stack.pop() {
        let node_path = match segment(node) {
            Some(segment) => {
                let path = join(&parent_path, &segment);
                if is_document(node) {
                    let path = unclaimed(path, &parent_path, &segment, node, &claimed);
                    claimed.insert(path.clone());
                    tasks.push(FetchTask {
                        name: node.name().to_string(),
                        document_ref: node.reference().to_string(),
                        node_id: node.node_id.clone().unwrap_or_default(),
                        path: path.clone(),
                        is_leaf: node.is_leaf.unwrap_or(true),
                    });
                    path
                } else {
                    path
                }
            }
            None => parent_path,
        };

        for child in node.children.iter().rev() {
            stack.push((child, node_path.clone()));
        }
    }

    tasks
}

/// Render the tree as indented text, one node per line
pub fn render_tree(roots: &[CategoryNode]) -> String {
    let mut output = String::new();
    write_nodes(roots, 0, &mut output);
    output
}

fn write_nodes(nodes: &[CategoryNode], depth: usize, output: &mut String) {
    for node in nodes {
        if depth > 0 {
            output.push_str(&"  ".repeat(depth));
            output.push_str("├─ ");
        }

        let name = if node.name().is_empty() {
            "N/A"
        } else {
            node.name()
        };
        if node.reference().is_empty() {
            output.push_str(name);
        } else {
            output.push_str(&format!("{} ({})", name, node.reference()));
        }
        output.push('\n');

        write_nodes(&node.children, depth + 1, output);
    }
}

fn is_document(node: &CategoryNode) -> bool {
    !node.name().is_empty() && !node.reference().is_empty()
}

/// Path segment for a node, `None` for unnamed nodes
fn segment(node: &CategoryNode) -> Option<String> {
    if node.name().is_empty() {
        return None;
    }

    let segment = sanitize(node.name());
    if usable(&segment) {
        return Some(segment);
    }

    let id = sanitize(node.node_id.as_deref().unwrap_or(""));
    if usable(&id) {
        Some(id)
    } else {
        Some(UNTITLED_SEGMENT.to_string())
    }
}

/// Dot-only segments would resolve outside their parent directory
fn usable(segment: &str) -> bool {
    segment.chars().any(|c| c != '.')
}

fn join(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}/{}", parent, segment)
    }
}

fn unclaimed(
    path: String,
    parent: &str,
    segment: &str,
    node: &CategoryNode,
    claimed: &HashSet<String>,
) -> String {
    if !claimed.contains(&path) {
        return path;
    }

    let id = sanitize(node.node_id.as_deref().unwrap_or(""));
    if usable(&id) {
        let candidate = join(parent, &format!("{}~{}", segment, id));
        if !claimed.contains(&candidate) {
            return candidate;
        }
    }

    (2..)
        .map(|n| join(parent, &format!("{}~{}", segment, n)))
        .find(|candidate| !claimed.contains(candidate))
        .unwrap_or(path)
}
