//! ZIP archive ingestion.
//!
//! Size caps are enforced from the central directory before any entry is
//! decompressed; only allowlisted instruction files are ever inflated.

use super::content::read_instruction_content;
use super::{build_entry, ScanFilters, ScanOptions, ScanProgress, DEFAULT_ZIP_MAX_FILES};
use crate::error::{Result as CrateResult, ZipScanError};
use crate::models::{RepoScanResult, RepoTree};
use crate::utils::sanitize_repo_path;
use std::io::Cursor;
use std::path::Path;
use zip::ZipArchive;

/// Ratio checks only apply once the archive expands past this size; tiny
/// archives of repetitive text legitimately compress very well.
const RATIO_CHECK_FLOOR: u64 = 1024 * 1024;

struct PendingEntry {
    index: usize,
    path: String,
    size: u64,
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let units = ["KB", "MB", "GB"];
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < units.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, units[unit])
}

fn corrupt() -> ZipScanError {
    ZipScanError::corrupt("ZIP file could not be read. Re-export the archive and try again.")
}

pub fn scan_zip(bytes: &[u8], options: &ScanOptions) -> Result<RepoScanResult, ZipScanError> {
    scan_zip_with_progress(bytes, options, &mut |_| {})
}

/// Read an archive from disk and scan it. Read failures surface as
/// `Error::Io`, rejections as `Error::Zip`.
pub fn scan_zip_file(path: &Path, options: &ScanOptions) -> CrateResult<RepoScanResult> {
    let bytes = std::fs::read(path)?;
    log::debug!("scanning {} ({} bytes)", path.display(), bytes.len());
    Ok(scan_zip(&bytes, options)?)
}

/// Scan archive bytes into a `RepoScanResult`, reporting progress.
pub fn scan_zip_with_progress(
    bytes: &[u8],
    options: &ScanOptions,
    on_progress: &mut dyn FnMut(ScanProgress),
) -> Result<RepoScanResult, ZipScanError> {
    let compressed_len = bytes.len() as u64;
    if compressed_len > options.max_compressed_bytes {
        log::warn!("rejecting zip: {} bytes", compressed_len);
        return Err(ZipScanError::oversize(format!(
            "ZIP is {} and exceeds the {} limit. Upload a smaller ZIP or scan a folder instead.",
            format_bytes(compressed_len),
            format_bytes(options.max_compressed_bytes)
        )));
    }

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|err| {
        log::warn!("unreadable zip archive: {}", err);
        corrupt()
    })?;
    let filters = ScanFilters::new(options);
    let max_files = options.max_files.unwrap_or(DEFAULT_ZIP_MAX_FILES);

    // Pass 1: central directory only.
    let mut pending: Vec<PendingEntry> = Vec::new();
    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index).map_err(|_| corrupt())?;
        if entry.is_dir() {
            continue;
        }
        let Some(path) = sanitize_repo_path(entry.name()) else {
            log::warn!("skipping unsafe zip entry name: {:?}", entry.name());
            continue;
        };
        if filters.is_ignored(&path) {
            continue;
        }

        total_uncompressed = total_uncompressed.saturating_add(entry.size());
        total_compressed = total_compressed.saturating_add(entry.compressed_size());
        pending.push(PendingEntry {
            index,
            path,
            size: entry.size(),
        });

        if pending.len() > max_files {
            return Err(ZipScanError::oversize(format!(
                "ZIP contains more than {} files. Upload a smaller archive or scan a folder.",
                max_files
            )));
        }
        if total_uncompressed > options.max_uncompressed_bytes {
            return Err(ZipScanError::oversize(format!(
                "ZIP expands to {}, exceeding the {} limit. Upload a smaller archive or scan a folder.",
                format_bytes(total_uncompressed),
                format_bytes(options.max_uncompressed_bytes)
            )));
        }
        let ratio_base = if total_compressed > 0 {
            total_compressed
        } else {
            compressed_len
        };
        if total_uncompressed > RATIO_CHECK_FLOOR
            && ratio_base > 0
            && total_uncompressed as f64 / ratio_base as f64 > options.max_compression_ratio
        {
            return Err(ZipScanError::oversize(
                "ZIP compression ratio is unusually high and may be unsafe. Try a smaller ZIP or scan a folder.",
            ));
        }
    }
    log::debug!(
        "zip central directory ok: {} entries, {} uncompressed",
        pending.len(),
        format_bytes(total_uncompressed)
    );

    // Pass 2: build the tree, inflating allowlisted entries only.
    let mut files = Vec::new();
    let mut total_files = 0usize;
    let mut matched_files = 0usize;
    for entry in pending {
        total_files += 1;
        if total_files % filters.progress_interval == 0 {
            on_progress(ScanProgress {
                total_files,
                matched_files,
            });
        }
        if !filters.is_included(&entry.path) {
            continue;
        }
        let read = if filters.wants_content(&entry.path) {
            let file = archive.by_index(entry.index).map_err(|_| corrupt())?;
            let read = read_instruction_content(Some(entry.size), file, &filters.policy)
                .map_err(|_| corrupt())?;
            Some(read)
        } else {
            None
        };
        files.push(build_entry(entry.path, read));
        matched_files += 1;
    }

    on_progress(ScanProgress {
        total_files,
        matched_files,
    });
    Ok(RepoScanResult {
        tree: RepoTree::from_files(files),
        total_files,
        matched_files,
        truncated: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ZipScanErrorKind};
    use crate::models::ContentStatus;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_scan_lists_files_and_skips_ignored_dirs() {
        let bytes = build_zip(&[
            ("AGENTS.md", b"# Agents"),
            ("README.md", b"# Readme"),
            ("node_modules/pkg/AGENTS.md", b"ignored"),
        ]);
        let result = scan_zip(&bytes, &ScanOptions::default()).unwrap();
        assert_eq!(result.tree.paths(), vec!["AGENTS.md", "README.md"]);
        assert_eq!(result.total_files, 2);
        assert_eq!(result.matched_files, 2);
        assert_eq!(result.tree.files[0].content, "");
    }

    #[test]
    fn test_content_only_for_allowlisted_paths() {
        let bytes = build_zip(&[("AGENTS.md", b"# Agents"), ("README.md", b"# Readme")]);
        let result = scan_zip(&bytes, &ScanOptions::with_content()).unwrap();
        let agents = &result.tree.files[0];
        assert_eq!(agents.content, "# Agents");
        assert_eq!(agents.content_status, Some(ContentStatus::Ok));
        assert_eq!(result.tree.files[1].content_status, None);
    }

    #[test]
    fn test_unsafe_names_are_skipped() {
        let bytes = build_zip(&[("../evil/AGENTS.md", b"x"), ("CLAUDE.md", b"y")]);
        let result = scan_zip(&bytes, &ScanOptions::default()).unwrap();
        assert_eq!(result.tree.paths(), vec!["CLAUDE.md"]);
    }

    #[test]
    fn test_compressed_cap_rejects_before_parsing() {
        let options = ScanOptions {
            max_compressed_bytes: 4,
            ..ScanOptions::default()
        };
        let err = scan_zip(b"not even a zip", &options).unwrap_err();
        assert_eq!(err.kind, ZipScanErrorKind::Oversize);
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let err = scan_zip(b"definitely not a zip archive", &ScanOptions::default()).unwrap_err();
        assert_eq!(err.kind, ZipScanErrorKind::Corrupt);
    }

    #[test]
    fn test_file_count_cap() {
        let bytes = build_zip(&[("a.md", b"a"), ("b.md", b"b"), ("c.md", b"c")]);
        let options = ScanOptions {
            max_files: Some(2),
            ..ScanOptions::default()
        };
        let err = scan_zip(&bytes, &options).unwrap_err();
        assert_eq!(err.kind, ZipScanErrorKind::Oversize);
    }

    #[test]
    fn test_progress_reports_final_counts() {
        let bytes = build_zip(&[("a.md", b"a"), ("b.md", b"b")]);
        let options = ScanOptions {
            progress_interval: 1,
            ..ScanOptions::default()
        };
        let mut seen = Vec::new();
        scan_zip_with_progress(&bytes, &options, &mut |p| seen.push(p)).unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen.last(),
            Some(&ScanProgress {
                total_files: 2,
                matched_files: 2
            })
        );
    }

    #[test]
    fn test_scan_zip_file_maps_errors() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("repo.zip");
        std::fs::write(&good, build_zip(&[("AGENTS.md", b"# Agents")])).unwrap();
        let result = scan_zip_file(&good, &ScanOptions::default()).unwrap();
        assert_eq!(result.tree.paths(), vec!["AGENTS.md"]);

        let bad = dir.path().join("bad.zip");
        std::fs::write(&bad, b"not a zip").unwrap();
        match scan_zip_file(&bad, &ScanOptions::default()) {
            Err(Error::Zip(err)) => assert_eq!(err.kind, ZipScanErrorKind::Corrupt),
            other => panic!("unexpected result {:?}", other.map(|r| r.total_files)),
        }

        let missing = scan_zip_file(&dir.path().join("nope.zip"), &ScanOptions::default());
        assert!(matches!(missing, Err(Error::Io(_))));
    }
}
