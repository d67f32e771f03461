//! In-memory repository tree consumed by every downstream pass.

use crate::utils::normalize_path;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Ok,
    Truncated,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentReason {
    Binary,
    TooLarge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One file of a scanned repository.
///
/// `path` is posix, relative, and never escapes the root. When
/// `content_status` is `Skipped`, `content` is empty.
pub struct RepoTreeFile {
    pub path: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_status: Option<ContentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_reason: Option<ContentReason>,
    /// Redacted form of `path` for sensitive names; absent when identical.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_path: Option<String>,
}

impl RepoTreeFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            content_status: None,
            content_reason: None,
            display_path: None,
        }
    }

    /// Path suitable for user-facing output.
    pub fn shown_path(&self) -> &str {
        self.display_path.as_deref().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Immutable list of repository files with unique paths.
pub struct RepoTree {
    pub files: Vec<RepoTreeFile>,
}

impl RepoTree {
    /// Build a tree, keeping the first entry for any duplicated path.
    pub fn from_files(files: Vec<RepoTreeFile>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let files = files
            .into_iter()
            .filter(|f| seen.insert(f.path.clone()))
            .collect();
        Self { files }
    }

    /// Content-less tree from a plain path list.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let files = paths
            .into_iter()
            .map(|p| normalize_path(p.as_ref()))
            .filter(|p| !p.is_empty())
            .map(|p| RepoTreeFile::new(p, ""))
            .collect();
        Self::from_files(files)
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn index(&self) -> TreeIndex<'_> {
        TreeIndex::new(self)
    }
}

/// Sorted lookup view over a `RepoTree`.
pub struct TreeIndex<'a> {
    files: BTreeMap<String, &'a RepoTreeFile>,
}

impl<'a> TreeIndex<'a> {
    pub fn new(tree: &'a RepoTree) -> Self {
        let mut files = BTreeMap::new();
        for file in &tree.files {
            let normalized = normalize_path(&file.path);
            if normalized.is_empty() {
                continue;
            }
            files.entry(normalized).or_insert(file);
        }
        Self { files }
    }

    pub fn has(&self, path: &str) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    /// All paths in lexicographic order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Non-empty content for a path, if any was read.
    pub fn content(&self, path: &str) -> Option<&'a str> {
        self.files
            .get(&normalize_path(path))
            .copied()
            .map(|f| f.content.as_str())
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Ingestion output shared by zip, file-list, and directory scans.
pub struct RepoScanResult {
    pub tree: RepoTree,
    pub total_files: usize,
    pub matched_files: usize,
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_files_dedupes_by_path() {
        let tree = RepoTree::from_files(vec![
            RepoTreeFile::new("AGENTS.md", "first"),
            RepoTreeFile::new("AGENTS.md", "second"),
        ]);
        assert_eq!(tree.files.len(), 1);
        assert_eq!(tree.files[0].content, "first");
    }

    #[test]
    fn test_index_normalizes_and_sorts() {
        let tree = RepoTree::from_paths(["b\\CLAUDE.md", "./AGENTS.md"]);
        let index = tree.index();
        assert_eq!(index.paths().collect::<Vec<_>>(), vec!["AGENTS.md", "b/CLAUDE.md"]);
        assert!(index.has("b/CLAUDE.md"));
        assert_eq!(index.content("AGENTS.md"), None);
    }

    #[test]
    fn test_skipped_status_serializes_reason() {
        let mut file = RepoTreeFile::new("AGENTS.md", "");
        file.content_status = Some(ContentStatus::Skipped);
        file.content_reason = Some(ContentReason::TooLarge);
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["contentStatus"], "skipped");
        assert_eq!(json["contentReason"], "too-large");
    }
}
