//! Path helpers shared by every pass, plus CLI message prefixes.
//!
//! All repository paths handled by the engine are posix, relative, and
//! free of `..` segments. `normalize_path` is the lenient form used on
//! already-trusted input; `sanitize_repo_path` is the strict form used at
//! ingestion boundaries where names come from archives or user text.

use owo_colors::OwoColorize;

/// Normalize separators and strip `./` prefixes and trailing slashes.
///
/// Returns an empty string for the repository root (`""`, `"."`, `"./"`).
pub fn normalize_path(value: &str) -> String {
    let replaced = value.trim().replace('\\', "/");
    let mut rest = replaced.as_str();
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped.trim_start_matches('/');
    }
    let rest = rest.trim_end_matches('/');
    if rest.is_empty() || rest == "." {
        return String::new();
    }
    rest.to_string()
}

/// Strict normalization for untrusted names.
///
/// Rejects drive letters and `..` segments, drops leading `/`, empty and
/// `.` segments. Returns `None` when nothing safe remains.
pub fn sanitize_repo_path(value: &str) -> Option<String> {
    let normalized = normalize_path(value);
    let bytes = normalized.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return None;
    }
    let mut segments: Vec<&str> = Vec::new();
    for segment in normalized.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Directory chain from the repository root (`""`) down to `cwd`, inclusive.
pub fn ancestor_dirs(cwd: &str) -> Vec<String> {
    let normalized = normalize_path(cwd);
    let mut dirs = vec![String::new()];
    if normalized.is_empty() {
        return dirs;
    }
    let mut current = String::new();
    for part in normalized.split('/').filter(|p| !p.is_empty()) {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(part);
        dirs.push(current.clone());
    }
    dirs
}

/// Join a directory (possibly the root `""`) and a file name.
pub fn join_dir_file(dir: &str, file_name: &str) -> String {
    if dir.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", dir, file_name)
    }
}

/// Parent directory of a repository path (`""` for top-level files).
pub fn dir_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Final path segment.
pub fn base_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// True when `path` is exactly `file_name` or ends with `/file_name`.
pub fn is_named_file(path: &str, file_name: &str) -> bool {
    base_name(path) == file_name
}

/// True when `path` lies inside `dir` (the root contains everything).
pub fn is_within(path: &str, dir: &str) -> bool {
    dir.is_empty() || path == dir || path.starts_with(&format!("{}/", dir))
}

fn use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if use_colors() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn note_prefix() -> String {
    if use_colors() {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}

pub fn info_prefix() -> String {
    if use_colors() {
        "info:".blue().bold().to_string()
    } else {
        "info:".to_string()
    }
}
