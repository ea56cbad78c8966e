//! Detection of already-harvested documents

use crate::types::FetchTask;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Extension of per-document output files
pub const OUTPUT_EXTENSION: &str = "md";

/// Output file location for a task under `output_root`
pub fn output_path(output_root: &Path, task: &FetchTask) -> PathBuf {
    output_root.join(format!("{}.{}", task.path, OUTPUT_EXTENSION))
}

/// Paths of the tasks whose output file already exists
///
/// A missing `output_root` simply means nothing has been harvested yet.
/// Existence is the only check: a truncated file counts as done.
pub fn scan(tasks: &[FetchTask], output_root: &Path) -> HashSet<String> {
    if !output_root.is_dir() {
        return HashSet::new();
    }

    tasks
        .iter()
        .filter(|task| output_path(output_root, task).is_file())
        .map(|task| task.path.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(path: &str) -> FetchTask {
        FetchTask {
            name: path.to_string(),
            document_ref: format!("ref-{}", path),
            path: path.to_string(),
            is_leaf: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_output_path() {
        let root = Path::new("docs");
        assert_eq!(
            output_path(root, &task("A/B")),
            Path::new("docs").join("A/B.md")
        );
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("does-not-exist");
        assert!(scan(&[task("A")], &root).is_empty());
    }

    #[test]
    fn test_scan_finds_existing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("A")).unwrap();
        std::fs::write(dir.path().join("A.md"), "# A").unwrap();
        std::fs::write(dir.path().join("A/B.md"), "").unwrap();

        let tasks = vec![task("A"), task("A/B"), task("A/C"), task("D")];
        let existing = scan(&tasks, dir.path());

        assert_eq!(existing.len(), 2);
        assert!(existing.contains("A"));
        assert!(existing.contains("A/B"));
        assert!(!existing.contains("A/C"));
    }

    #[test]
    fn test_scan_ignores_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("A.md")).unwrap();
        assert!(scan(&[task("A")], dir.path()).is_empty());
    }
}
