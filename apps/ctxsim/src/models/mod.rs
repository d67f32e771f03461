//! Shared data models for resolution, diagnostics, and lint outputs.
//!
//! Everything here serializes to plain camelCase JSON so results can cross
//! the worker boundary or be printed by the CLI without adaptation.

pub mod code;
pub mod tool;
pub mod tree;

pub use code::DiagnosticCode;
pub use tool::SimulatorToolId;
pub use tree::{ContentReason, ContentStatus, RepoScanResult, RepoTree, RepoTreeFile, TreeIndex};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Finding severity. Only `error` affects CLI exit codes.
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A resolution warning or static diagnostic, keyed by a stable `code`.
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_path: Option<String>,
}

impl Diagnostic {
    /// Diagnostic with the code's fixed severity.
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code: code.as_str().to_string(),
            severity: code.severity(),
            message: message.into(),
            suggestion: None,
            path: None,
            expected_path: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_expected_path(mut self, expected: impl Into<String>) -> Self {
        self.expected_path = Some(expected.into());
        self
    }
}

/// Resolution-level warnings share the diagnostic shape.
pub type Warning = Diagnostic;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A file the tool would load for the simulated working directory.
pub struct LoadedFile {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A file of the tool's role that exists but does not apply here.
pub struct ShadowedFile {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A single content lint issue.
pub struct LintIssue {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Content lint results container.
///
/// `checked_files + skipped_files` equals the number of instruction
/// candidates examined.
pub struct ContentLintResult {
    pub issues: Vec<LintIssue>,
    pub checked_files: usize,
    pub skipped_files: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Aggregated severity counts used by printers and exit codes.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
}

impl Summary {
    pub fn from_severities<I: IntoIterator<Item = Severity>>(items: I) -> Self {
        let mut summary = Summary::default();
        for sev in items {
            match sev {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
            }
        }
        summary
    }
}
