//! Content lint for instruction files.
//!
//! Only allowlisted instruction paths are candidates. Each candidate is
//! either skipped (content was not captured) or checked; files are linted
//! in parallel and issues are re-sorted by path then code.

use crate::front_matter::{front_matter_block, parse_front_matter};
use crate::ingest::content::DEFAULT_MAX_CONTENT_BYTES;
use crate::ingest::is_allowlisted_instruction_path;
use crate::models::{ContentLintResult, ContentReason, ContentStatus, LintIssue, RepoTree, RepoTreeFile, Severity};
use rayon::prelude::*;

const COMMAND_HINTS: &[&str] = &[
    "pnpm", "npm", "yarn", "bun", "cargo", "test", "lint", "type-check", "typecheck", "install",
];

const ROOT_INSTRUCTIONS: &[&str] = &["AGENTS.md", "CLAUDE.md", "GEMINI.md", ".github/copilot-instructions.md"];

fn is_scoped_copilot_instruction(path: &str) -> bool {
    (path.starts_with(".github/instructions/") || path.starts_with(".github/copilot-instructions/"))
        && path.ends_with(".instructions.md")
}

fn is_cursor_rule(path: &str) -> bool {
    path.starts_with(".cursor/rules/") && path.ends_with(".mdc")
}

fn has_apply_to(content: &str) -> bool {
    parse_front_matter(content).is_some_and(|fm| !fm.apply_to.is_empty())
}

fn has_command_hints(content: &str) -> bool {
    let haystack = content.to_lowercase();
    COMMAND_HINTS.iter().any(|hint| haystack.contains(hint))
}

fn issue(code: &str, message: String, suggestion: &str, path: &str) -> LintIssue {
    LintIssue {
        code: code.to_string(),
        severity: Severity::Warning,
        message,
        suggestion: Some(suggestion.to_string()),
        path: path.to_string(),
    }
}

enum FileOutcome {
    Checked(Vec<LintIssue>),
    Skipped(Vec<LintIssue>),
}

fn lint_file(file: &RepoTreeFile) -> FileOutcome {
    let shown = file.shown_path();
    let kb = DEFAULT_MAX_CONTENT_BYTES / 1024;

    if file.content_status == Some(ContentStatus::Skipped) {
        // A skip without a recorded reason is reported as oversized.
        let found = match file.content_reason {
            Some(ContentReason::Binary) => issue(
                "content-binary",
                "Instruction file appears to be binary and was skipped.".into(),
                "Use a plain-text .md file for instructions.",
                shown,
            ),
            Some(ContentReason::TooLarge) | None => issue(
                "content-too-large",
                format!("Instruction file is larger than {} KB and was skipped.", kb),
                "Trim the file or split instructions into scoped files.",
                shown,
            ),
        };
        return FileOutcome::Skipped(vec![found]);
    }

    let mut issues = Vec::new();
    let content = file.content.as_str();
    if content.trim().is_empty() {
        // Path-only trees carry no status; their content is unknown, not empty.
        if file.content_status.is_some() {
            issues.push(issue(
                "content-empty",
                "Instruction file is empty.".into(),
                "Add instructions or remove the file.",
                shown,
            ));
        }
        return FileOutcome::Checked(issues);
    }

    if file.content_status == Some(ContentStatus::Truncated) {
        issues.push(issue(
            "content-truncated",
            format!("Instruction content was truncated at {} KB.", kb),
            "Trim the file or split instructions into scoped files.",
            shown,
        ));
    }
    if is_scoped_copilot_instruction(&file.path) && !has_apply_to(content) {
        issues.push(issue(
            "missing-front-matter",
            "Scoped Copilot instructions should include applyTo front matter.".into(),
            "Add a YAML header like: ---\napplyTo: \"**/*\"\n---",
            shown,
        ));
    }
    if is_cursor_rule(&file.path) && front_matter_block(content).is_none() {
        issues.push(issue(
            "missing-front-matter",
            "Cursor rules should start with front matter.".into(),
            "Add a YAML header like: ---\ndescription: ...\nalwaysApply: true\n---",
            shown,
        ));
    }
    if ROOT_INSTRUCTIONS.contains(&file.path.as_str()) && !has_command_hints(content) {
        issues.push(issue(
            "missing-commands",
            "Consider adding install/test/lint commands to your instructions.".into(),
            "Include common commands (install, test, lint) so tooling runs are clear.",
            shown,
        ));
    }
    FileOutcome::Checked(issues)
}

/// Lint the allowlisted instruction files of a tree.
pub fn lint_instruction_content(tree: &RepoTree) -> ContentLintResult {
    let outcomes: Vec<FileOutcome> = tree
        .files
        .par_iter()
        .filter(|f| is_allowlisted_instruction_path(&f.path))
        .map(lint_file)
        .collect();

    let mut result = ContentLintResult::default();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Checked(issues) => {
                result.checked_files += 1;
                result.issues.extend(issues);
            }
            FileOutcome::Skipped(issues) => {
                result.skipped_files += 1;
                result.issues.extend(issues);
            }
        }
    }
    result
        .issues
        .sort_by(|a, b| a.path.cmp(&b.path).then(a.code.cmp(&b.code)));
    log::debug!(
        "content lint: {} checked, {} skipped, {} issues",
        result.checked_files,
        result.skipped_files,
        result.issues.len()
    );
    result
}
