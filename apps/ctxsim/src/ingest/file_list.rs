//! Ingestion from a picked list of files (browser folder pickers, drag and
//! drop, or any caller holding names plus optional bytes).

use super::content::read_instruction_content;
use super::{build_entry, ScanFilters, ScanOptions, ScanProgress, DEFAULT_MAX_FILES};
use crate::models::{RepoScanResult, RepoTree};
use crate::utils::sanitize_repo_path;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLike {
    pub name: String,
    /// Path including the picked root folder, e.g. `repo/src/AGENTS.md`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,
}

impl FileLike {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_relative_path(mut self, path: impl Into<String>) -> Self {
        self.relative_path = Some(path.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        self.size = Some(data.len() as u64);
        self.data = Some(data);
        self
    }

    /// Repository path: the relative path minus its root folder, else the name.
    fn repo_path(&self) -> Option<String> {
        match self.relative_path.as_deref().map(|p| p.replace('\\', "/")) {
            Some(rel) if rel.contains('/') => {
                let stripped = rel.trim_start_matches('/');
                let without_root = stripped.split_once('/').map(|(_, rest)| rest).unwrap_or(stripped);
                sanitize_repo_path(without_root)
            }
            _ => sanitize_repo_path(&self.name),
        }
    }
}

pub fn scan_file_list(files: &[FileLike], options: &ScanOptions) -> RepoScanResult {
    scan_file_list_with_progress(files, options, &mut |_| {})
}

/// Build a tree from picked files. Stops at `max_files` and flags
/// `truncated` instead of failing.
pub fn scan_file_list_with_progress(
    files: &[FileLike],
    options: &ScanOptions,
    on_progress: &mut dyn FnMut(ScanProgress),
) -> RepoScanResult {
    let filters = ScanFilters::new(options);
    let max_files = options.max_files.unwrap_or(DEFAULT_MAX_FILES);
    let mut entries = Vec::new();
    let mut total_files = 0usize;
    let mut matched_files = 0usize;
    let mut truncated = false;

    for file in files {
        if total_files >= max_files {
            truncated = true;
            break;
        }
        let Some(path) = file.repo_path() else {
            log::debug!("skipping file with unusable name: {:?}", file.name);
            continue;
        };
        if filters.is_ignored(&path) {
            continue;
        }
        total_files += 1;
        if total_files % filters.progress_interval == 0 {
            on_progress(ScanProgress {
                total_files,
                matched_files,
            });
        }
        if !filters.is_included(&path) {
            continue;
        }

        let read = match (&file.data, filters.wants_content(&path)) {
            (Some(data), true) => {
                match read_instruction_content(file.size, data.as_slice(), &filters.policy) {
                    Ok(read) => Some(read),
                    Err(err) => {
                        log::warn!("could not read {}: {}", path, err);
                        None
                    }
                }
            }
            _ => None,
        };
        entries.push(build_entry(path, read));
        matched_files += 1;
    }

    on_progress(ScanProgress {
        total_files,
        matched_files,
    });
    RepoScanResult {
        tree: RepoTree::from_files(entries),
        total_files,
        matched_files,
        truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentReason, ContentStatus};

    #[test]
    fn test_relative_paths_strip_root_folder() {
        let files = vec![
            FileLike::named("AGENTS.md").with_relative_path("my-repo/AGENTS.md"),
            FileLike::named("CLAUDE.md").with_relative_path("my-repo/apps/CLAUDE.md"),
            FileLike::named("GEMINI.md"),
        ];
        let result = scan_file_list(&files, &ScanOptions::default());
        assert_eq!(result.tree.paths(), vec!["AGENTS.md", "apps/CLAUDE.md", "GEMINI.md"]);
    }

    #[test]
    fn test_max_files_truncates() {
        let files: Vec<FileLike> = (0..5).map(|i| FileLike::named(format!("f{i}.md"))).collect();
        let options = ScanOptions {
            max_files: Some(3),
            ..ScanOptions::default()
        };
        let result = scan_file_list(&files, &options);
        assert!(result.truncated);
        assert_eq!(result.total_files, 3);
        assert_eq!(result.tree.files.len(), 3);
    }

    #[test]
    fn test_ignored_and_unsafe_entries_are_dropped() {
        let files = vec![
            FileLike::named("x").with_relative_path("repo/node_modules/x/AGENTS.md"),
            FileLike::named("../AGENTS.md"),
            FileLike::named("AGENTS.md"),
        ];
        let result = scan_file_list(&files, &ScanOptions::default());
        assert_eq!(result.tree.paths(), vec!["AGENTS.md"]);
        assert_eq!(result.total_files, 1);
    }

    #[test]
    fn test_content_read_when_requested() {
        let files = vec![
            FileLike::named("AGENTS.md").with_data("Run `cargo test`."),
            FileLike::named("CLAUDE.md").with_data(vec![0u8, 1, 2]),
            FileLike::named("notes.md").with_data("not read"),
        ];
        let result = scan_file_list(&files, &ScanOptions::with_content());
        let by_path = |p: &str| result.tree.files.iter().find(|f| f.path == p).unwrap();
        assert_eq!(by_path("AGENTS.md").content, "Run `cargo test`.");
        assert_eq!(by_path("CLAUDE.md").content_status, Some(ContentStatus::Skipped));
        assert_eq!(by_path("CLAUDE.md").content_reason, Some(ContentReason::Binary));
        assert_eq!(by_path("notes.md").content, "");
    }
}
