//! Local directory ingestion used by the CLI.

use super::content::read_instruction_content;
use super::{build_entry, ScanFilters, ScanOptions, DEFAULT_MAX_FILES};
use crate::error::Result;
use crate::models::{RepoScanResult, RepoTree};
use crate::utils::sanitize_repo_path;
use std::fs;
use std::path::{Path, PathBuf};

/// Collect up to `limit` repository-relative file paths under `root`,
/// pruning ignored directories before descending. Each directory is read in
/// name order so the cut-off is deterministic. Symlinks are not followed.
fn walk(root: &Path, filters: &ScanFilters, limit: usize) -> Result<Vec<(String, PathBuf)>> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    'dirs: while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if dir == root => return Err(err.into()),
            Err(err) => {
                log::warn!("skipping unreadable directory {}: {}", dir.display(), err);
                continue;
            }
        };
        let mut entries: Vec<fs::DirEntry> = entries.flatten().collect();
        entries.sort_by_key(|entry| entry.file_name());
        let mut subdirs = Vec::new();
        for entry in entries {
            let Ok(ty) = entry.file_type() else { continue };
            let path = entry.path();
            let Some(rel) = pathdiff::diff_paths(&path, root)
                .and_then(|p| sanitize_repo_path(&p.to_string_lossy()))
            else {
                continue;
            };
            if filters.is_ignored(&rel) {
                continue;
            }
            if ty.is_dir() {
                subdirs.push(path);
            } else if ty.is_file() {
                out.push((rel, path));
                if out.len() >= limit {
                    break 'dirs;
                }
            }
        }
        stack.extend(subdirs.into_iter().rev());
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

/// Scan a directory on disk with the same policy as archive and list scans.
pub fn scan_directory(root: &Path, options: &ScanOptions) -> Result<RepoScanResult> {
    let filters = ScanFilters::new(options);
    let max_files = options.max_files.unwrap_or(DEFAULT_MAX_FILES);
    let found = walk(root, &filters, max_files.saturating_add(1))?;
    let truncated = found.len() > max_files;
    log::debug!(
        "walked {}: {} files{}",
        root.display(),
        found.len(),
        if truncated { " (truncated)" } else { "" }
    );

    let mut files = Vec::new();
    let mut total_files = 0usize;
    for (rel, abs) in found.into_iter().take(max_files) {
        total_files += 1;
        if !filters.is_included(&rel) {
            continue;
        }
        let read = if filters.wants_content(&rel) {
            let opened = fs::File::open(&abs).and_then(|file| {
                let size = file.metadata().ok().map(|m| m.len());
                read_instruction_content(size, file, &filters.policy)
            });
            match opened {
                Ok(read) => Some(read),
                Err(err) => {
                    log::warn!("could not read {}: {}", abs.display(), err);
                    None
                }
            }
        } else {
            None
        };
        files.push(build_entry(rel, read));
    }

    let matched_files = files.len();
    Ok(RepoScanResult {
        tree: RepoTree::from_files(files),
        total_files,
        matched_files,
        truncated,
    })
}
