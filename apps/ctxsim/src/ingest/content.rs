//! Instruction content policy: allowlist, binary sniffing, bounded reads,
//! UTF-8-safe truncation, and sensitive-path redaction.

use crate::models::{ContentReason, ContentStatus, RepoTreeFile};
use crate::utils::normalize_path;
use regex::Regex;
use std::io::{self, Read};
use std::sync::OnceLock;

pub const DEFAULT_MAX_CONTENT_BYTES: usize = 64 * 1024;
pub const DEFAULT_MAX_READ_BYTES: u64 = 1024 * 1024;

const BINARY_SNIFF_BYTES: usize = 8000;
const BINARY_SUSPICIOUS_RATIO: f64 = 0.3;

const DEFAULT_ALLOWLIST: &[&str] = &[
    r"(^|/)AGENTS\.md$",
    r"(^|/)AGENTS\.override\.md$",
    r"(^|/)CLAUDE\.md$",
    r"(^|/)GEMINI\.md$",
    r"^\.github/copilot-instructions\.md$",
    r"^\.github/copilot-instructions/.+\.instructions\.md$",
    r"^\.github/instructions/.+\.instructions\.md$",
    r"^\.github/agents/.+",
    r"^\.cursor/rules/.+",
    r"^\.cursorrules$",
];

const SENSITIVE_BASENAMES: &[&str] = &[
    r"^\.?env(\..+)?$",
    r"^\.?netrc$",
    r"^\.?npmrc$",
    r"^\.?pypirc$",
    r"^\.?git-credentials$",
    r"^\.?dockercfg$",
    r"^\.?dockerconfigjson$",
    r"^id_(rsa|dsa|ecdsa|ed25519)(\.pub)?$",
    r"^authorized_keys$",
    r"^known_hosts$",
    r"^credentials?$",
    r"^passw(or)?d$",
    r"^api[-_]?key$",
    r"^token$",
];

const SENSITIVE_DIRS: &[&str] = &[".ssh", ".gnupg", ".aws", ".azure", ".gcp", ".kube"];

const SENSITIVE_EXTENSIONS: &[&str] = &[".pem", ".key", ".p12", ".pfx", ".kdbx", ".jks", ".keystore"];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

fn default_allowlist() -> &'static [Regex] {
    static ALLOWLIST: OnceLock<Vec<Regex>> = OnceLock::new();
    ALLOWLIST.get_or_init(|| compile(DEFAULT_ALLOWLIST))
}

fn sensitive_basenames() -> &'static [Regex] {
    static BASENAMES: OnceLock<Vec<Regex>> = OnceLock::new();
    BASENAMES.get_or_init(|| compile(SENSITIVE_BASENAMES))
}

/// True for paths whose content the engine is willing to read.
pub fn is_allowlisted_instruction_path(path: &str) -> bool {
    let normalized = normalize_path(path);
    !normalized.is_empty() && default_allowlist().iter().any(|re| re.is_match(&normalized))
}

/// Limits applied to a single content read.
#[derive(Debug, Clone)]
pub struct ContentPolicy {
    /// `None` uses the built-in instruction allowlist.
    pub allowlist: Option<Vec<Regex>>,
    pub max_content_bytes: usize,
    pub max_read_bytes: u64,
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self {
            allowlist: None,
            max_content_bytes: DEFAULT_MAX_CONTENT_BYTES,
            max_read_bytes: DEFAULT_MAX_READ_BYTES,
        }
    }
}

impl ContentPolicy {
    pub fn is_allowlisted(&self, path: &str) -> bool {
        match &self.allowlist {
            Some(list) => {
                let normalized = normalize_path(path);
                !normalized.is_empty() && list.iter().any(|re| re.is_match(&normalized))
            }
            None => is_allowlisted_instruction_path(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRead {
    Loaded { content: String, truncated: bool },
    Skipped(ContentReason),
}

impl ContentRead {
    pub fn apply_to(self, file: &mut RepoTreeFile) {
        match self {
            ContentRead::Loaded { content, truncated } => {
                file.content = content;
                file.content_status = Some(if truncated {
                    ContentStatus::Truncated
                } else {
                    ContentStatus::Ok
                });
                file.content_reason = None;
            }
            ContentRead::Skipped(reason) => {
                file.content.clear();
                file.content_status = Some(ContentStatus::Skipped);
                file.content_reason = Some(reason);
            }
        }
    }
}

/// NUL anywhere in the sample, or too many control bytes, means binary.
pub fn is_binary(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(BINARY_SNIFF_BYTES)];
    if sample.is_empty() {
        return false;
    }
    let mut suspicious = 0usize;
    for &byte in sample {
        if byte == 0 {
            return true;
        }
        if byte < 7 || byte == 11 || byte == 12 || (byte > 13 && byte < 32) || byte == 127 {
            suspicious += 1;
        }
    }
    suspicious as f64 / sample.len() as f64 > BINARY_SUSPICIOUS_RATIO
}

/// Decode at most `max_bytes`, cutting on a character boundary.
pub fn truncate_utf8(bytes: &[u8], max_bytes: usize) -> (String, bool) {
    if bytes.len() <= max_bytes {
        return (String::from_utf8_lossy(bytes).into_owned(), false);
    }
    let mut cut = max_bytes;
    // bytes[cut] is the first excluded byte; back off while it continues a char.
    while cut > 0 && (bytes[cut] & 0xC0) == 0x80 {
        cut -= 1;
    }
    (String::from_utf8_lossy(&bytes[..cut]).into_owned(), true)
}

/// Read one allowlisted file under the policy limits.
///
/// A declared size above `max_read_bytes` is rejected without reading, and
/// the read itself is capped so an understated size cannot force a large
/// allocation.
pub fn read_instruction_content<R: Read>(
    declared_size: Option<u64>,
    reader: R,
    policy: &ContentPolicy,
) -> io::Result<ContentRead> {
    if declared_size.is_some_and(|size| size > policy.max_read_bytes) {
        return Ok(ContentRead::Skipped(ContentReason::TooLarge));
    }
    let mut buf = Vec::new();
    reader
        .take(policy.max_read_bytes.saturating_add(1))
        .read_to_end(&mut buf)?;
    if buf.len() as u64 > policy.max_read_bytes {
        return Ok(ContentRead::Skipped(ContentReason::TooLarge));
    }
    if is_binary(&buf) {
        return Ok(ContentRead::Skipped(ContentReason::Binary));
    }
    let (content, truncated) = truncate_utf8(&buf, policy.max_content_bytes);
    Ok(ContentRead::Loaded { content, truncated })
}

fn redact_basename(name: &str) -> String {
    if name.to_ascii_lowercase().starts_with(".env") {
        return "[redacted].env".to_string();
    }
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx < name.len() - 1 => format!("[redacted]{}", &name[idx..]),
        _ => "[redacted]".to_string(),
    }
}

/// Replace the file name of credential-like paths with `[redacted]`,
/// keeping the directory and extension.
pub fn redact_sensitive_path(path: &str) -> String {
    let normalized = normalize_path(path);
    if normalized.is_empty() {
        return normalized;
    }
    let (dir, name) = match normalized.rfind('/') {
        Some(idx) => (&normalized[..=idx], &normalized[idx + 1..]),
        None => ("", normalized.as_str()),
    };
    let lower_path = normalized.to_ascii_lowercase();
    let lower_name = name.to_ascii_lowercase();

    let sensitive_location = lower_path.starts_with(".aws/credentials")
        || lower_path.starts_with(".aws/config")
        || lower_path == ".kube/config"
        || dir
            .split('/')
            .any(|segment| SENSITIVE_DIRS.contains(&segment.to_ascii_lowercase().as_str()));
    if sensitive_location || sensitive_basenames().iter().any(|re| re.is_match(&lower_name)) {
        return format!("{}{}", dir, redact_basename(name));
    }
    if let Some(ext) = SENSITIVE_EXTENSIONS.iter().find(|ext| lower_name.ends_with(*ext)) {
        return format!("{}[redacted]{}", dir, ext);
    }
    normalized
}
