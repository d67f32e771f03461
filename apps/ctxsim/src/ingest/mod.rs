//! Repository ingestion: ZIP archives, file lists, pasted path listings,
//! and local directories all become a `RepoTree`.
//!
//! Every source applies the same policy:
//! - entries under ignored directories are dropped before any accounting;
//! - paths are sanitized (no `..`, drive letters, or leading `/`);
//! - content is read only when requested, and only for allowlisted
//!   instruction paths, with binary sniffing and UTF-8-safe truncation;
//! - sensitive names get a redacted `display_path`.

pub mod archive;
pub mod content;
pub mod file_list;
pub mod fs;
pub mod tree_text;

pub use archive::{scan_zip, scan_zip_file, scan_zip_with_progress};
pub use content::{is_allowlisted_instruction_path, redact_sensitive_path};
pub use file_list::{scan_file_list, scan_file_list_with_progress, FileLike};
pub use fs::scan_directory;
pub use tree_text::{parse_repo_input, tree_from_paths, RepoPathParseIssue, RepoPathParseResult};

use crate::models::RepoTreeFile;
use content::{ContentPolicy, ContentRead};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    ".git",
    ".next",
    ".beads",
    "node_modules",
    "dist",
    "build",
    "coverage",
    "test-results",
];

pub const DEFAULT_MAX_FILES: usize = 5_000;
pub const DEFAULT_ZIP_MAX_FILES: usize = 10_000;
pub const DEFAULT_MAX_COMPRESSED_BYTES: u64 = 50 * 1024 * 1024;
pub const DEFAULT_MAX_UNCOMPRESSED_BYTES: u64 = 200 * 1024 * 1024;
pub const DEFAULT_MAX_COMPRESSION_RATIO: f64 = 25.0;
pub const DEFAULT_PROGRESS_INTERVAL: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Limits and filters shared by every ingestion source.
///
/// Regex-valued fields are stored as source strings so options can travel
/// inside worker messages; invalid patterns are logged and ignored.
pub struct ScanOptions {
    pub ignore_dirs: Vec<String>,
    /// Defaults to 10 000 for archives and 5 000 for lists and directories.
    pub max_files: Option<usize>,
    pub max_compressed_bytes: u64,
    pub max_uncompressed_bytes: u64,
    pub max_compression_ratio: f64,
    /// When non-empty, only paths matching one of these regexes are kept.
    pub include_only: Vec<String>,
    pub include_content: bool,
    /// Overrides the built-in instruction allowlist.
    pub content_allowlist: Option<Vec<String>>,
    pub max_content_bytes: usize,
    pub max_read_bytes: u64,
    pub progress_interval: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|s| s.to_string()).collect(),
            max_files: None,
            max_compressed_bytes: DEFAULT_MAX_COMPRESSED_BYTES,
            max_uncompressed_bytes: DEFAULT_MAX_UNCOMPRESSED_BYTES,
            max_compression_ratio: DEFAULT_MAX_COMPRESSION_RATIO,
            include_only: Vec::new(),
            include_content: false,
            content_allowlist: None,
            max_content_bytes: content::DEFAULT_MAX_CONTENT_BYTES,
            max_read_bytes: content::DEFAULT_MAX_READ_BYTES,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl ScanOptions {
    /// Options that also read allowlisted instruction content.
    pub fn with_content() -> Self {
        Self {
            include_content: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    pub total_files: usize,
    pub matched_files: usize,
}

/// Compiled form of `ScanOptions` used while walking a source.
pub(crate) struct ScanFilters {
    ignore_dirs: Vec<String>,
    include_only: Vec<Regex>,
    pub(crate) include_content: bool,
    pub(crate) policy: ContentPolicy,
    pub(crate) progress_interval: usize,
}

fn compile_all(sources: &[String], what: &str) -> Vec<Regex> {
    sources
        .iter()
        .filter_map(|src| match Regex::new(src) {
            Ok(re) => Some(re),
            Err(err) => {
                log::warn!("ignoring invalid {} pattern '{}': {}", what, src, err);
                None
            }
        })
        .collect()
}

impl ScanFilters {
    pub(crate) fn new(options: &ScanOptions) -> Self {
        let allowlist = options
            .content_allowlist
            .as_ref()
            .map(|list| compile_all(list, "content allowlist"));
        Self {
            ignore_dirs: options.ignore_dirs.clone(),
            include_only: compile_all(&options.include_only, "include-only"),
            include_content: options.include_content,
            policy: ContentPolicy {
                allowlist,
                max_content_bytes: options.max_content_bytes,
                max_read_bytes: options.max_read_bytes,
            },
            progress_interval: options.progress_interval.max(1),
        }
    }

    pub(crate) fn is_ignored(&self, path: &str) -> bool {
        path.split('/')
            .any(|segment| self.ignore_dirs.iter().any(|d| d == segment))
    }

    pub(crate) fn is_included(&self, path: &str) -> bool {
        self.include_only.is_empty() || self.include_only.iter().any(|re| re.is_match(path))
    }

    /// Content is read only on request and only for allowlisted paths.
    pub(crate) fn wants_content(&self, path: &str) -> bool {
        self.include_content && self.policy.is_allowlisted(path)
    }
}

/// Assemble a tree entry, attaching content state and redacted display path.
pub(crate) fn build_entry(path: String, read: Option<ContentRead>) -> RepoTreeFile {
    let display = redact_sensitive_path(&path);
    let mut file = RepoTreeFile::new(path, "");
    if display != file.path {
        file.display_path = Some(display);
    }
    if let Some(read) = read {
        read.apply_to(&mut file);
    }
    file
}
