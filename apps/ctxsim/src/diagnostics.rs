//! Static diagnostics over a repository tree for one tool.
//!
//! Independent of resolution: the pass looks at names and placement only
//! (plus Claude imports, which need content). Every check is driven by the
//! tool's `ToolProfile`, so the codes a tool can raise are visible in
//! `rules.rs`.

use crate::imports::{resolve_claude_imports, ClaudeImportIssue, ClaudeImportIssueKind};
use crate::models::{Diagnostic, DiagnosticCode, RepoTree, SimulatorToolId, TreeIndex};
use crate::rules::{self, CaseRule, Finding, PathRule, Resolution, ToolProfile, CASE_RULES, PROFILES};
use crate::utils::{ancestor_dirs, base_name, dir_name, is_named_file, join_dir_file, normalize_path};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsInput {
    pub tool: SimulatorToolId,
    pub tree: RepoTree,
    /// `None` means the caller did not say where the tool runs.
    #[serde(default)]
    pub cwd: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionDiagnostics {
    pub tool: SimulatorToolId,
    pub diagnostics: Vec<Diagnostic>,
}

impl InstructionDiagnostics {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == crate::models::Severity::Error)
    }
}

fn from_finding(finding: &Finding) -> Diagnostic {
    let mut diag = Diagnostic::new(finding.code, finding.message).with_suggestion(finding.suggestion);
    if let Some(expected) = finding.expected_path {
        diag = diag.with_expected_path(expected);
    }
    diag
}

/// Wrong-case variant of a required name, with the corrected path.
fn case_mismatch(rule: &CaseRule, path: &str) -> Option<(String, &'static str)> {
    match rule.rule {
        PathRule::Named(name) => {
            let base = base_name(path);
            (base != name && base.eq_ignore_ascii_case(name))
                .then(|| (join_dir_file(dir_name(path), name), name))
        }
        PathRule::Exact(expected) => {
            (path != expected && path.eq_ignore_ascii_case(expected)).then(|| (expected.to_string(), expected))
        }
        PathRule::Under { .. } => None,
    }
}

fn case_diagnostics(paths: &[&str], out: &mut Vec<Diagnostic>) {
    for rule in CASE_RULES {
        for path in paths {
            if let Some((expected_path, expected_name)) = case_mismatch(rule, path) {
                out.push(
                    Diagnostic::new(
                        rule.code,
                        format!("Found '{}' but {} expects '{}'.", path, rule.tool_label, expected_name),
                    )
                    .with_suggestion(rule.suggestion)
                    .with_path(*path)
                    .with_expected_path(expected_path),
                );
            }
        }
    }
}

fn stacking_diagnostics(
    profile: &ToolProfile,
    file_name: &str,
    override_name: Option<&str>,
    index: &TreeIndex<'_>,
    paths: &[&str],
    cwd: Option<&str>,
    out: &mut Vec<Diagnostic>,
) {
    let label = profile.tool.label();
    let has_any = paths.iter().any(|p| is_named_file(p, file_name));
    if !has_any {
        out.push(from_finding(&profile.missing));
    } else if !index.has(file_name) {
        if let Some(finding) = &profile.missing_root {
            out.push(from_finding(finding));
        }
    }

    if let Some(override_name) = override_name {
        for path in paths.iter().filter(|p| is_named_file(p, override_name)) {
            let base = join_dir_file(dir_name(path), file_name);
            if !index.has(&base) {
                out.push(
                    Diagnostic::new(
                        DiagnosticCode::OverrideWithoutBase,
                        format!(
                            "Found {} without a matching {} in the same folder.",
                            path, file_name
                        ),
                    )
                    .with_suggestion(format!("Add {} so the override has a base file to replace.", base))
                    .with_path(*path)
                    .with_expected_path(base),
                );
            }
        }
    }

    match cwd {
        None => out.push(
            Diagnostic::new(
                DiagnosticCode::MissingCwd,
                format!("Current directory (cwd) is required for {} ancestor lookups.", label),
            )
            .with_suggestion(format!(
                "Set cwd to the directory where {} runs (e.g., src/app).",
                label
            )),
        ),
        Some(cwd) => {
            let in_ancestry = ancestor_dirs(&normalize_path(cwd)).iter().any(|dir| {
                index.has(&join_dir_file(dir, file_name))
                    || override_name.is_some_and(|name| index.has(&join_dir_file(dir, name)))
            });
            if !in_ancestry {
                let loads = if profile.tool == SimulatorToolId::ClaudeCode {
                    "memory files"
                } else {
                    "instructions"
                };
                out.push(
                    Diagnostic::new(
                        DiagnosticCode::NoAncestorInstructions,
                        format!(
                            "No {} files are in the cwd ancestry. {} may not load any {}.",
                            file_name, label, loads
                        ),
                    )
                    .with_suggestion(format!(
                        "Confirm cwd and place {} in the repo root or a parent directory.",
                        file_name
                    )),
                );
            }
        }
    }
}

fn import_diagnostic(issue: &ClaudeImportIssue) -> Diagnostic {
    let (code, message, suggestion) = match issue.kind {
        ClaudeImportIssueKind::Missing => (
            DiagnosticCode::ClaudeImportMissing,
            format!("Claude import not found: {}.", issue.raw_path),
            "Add the missing file or update the @path reference.",
        ),
        ClaudeImportIssueKind::OutsideRoot => (
            DiagnosticCode::ClaudeImportOutsideRoot,
            format!("Claude import points outside the repo: {}.", issue.raw_path),
            "Use a repo-relative path in @path imports.",
        ),
        ClaudeImportIssueKind::Circular => (
            DiagnosticCode::ClaudeImportCircular,
            format!("Circular Claude import detected via {}.", issue.raw_path),
            "Remove the cycle by flattening or removing one @path reference.",
        ),
    };
    let mut diag = Diagnostic::new(code, message)
        .with_suggestion(suggestion)
        .with_path(issue.source_path.clone());
    if !issue.resolved_path.is_empty() && issue.kind != ClaudeImportIssueKind::OutsideRoot {
        diag = diag.with_expected_path(issue.resolved_path.clone());
    }
    diag
}

fn placement_diagnostics(profile: &ToolProfile, paths: &[&str], out: &mut Vec<Diagnostic>) {
    if let Some(rule) = &profile.deprecated {
        let has_legacy = paths.iter().any(|p| rule.legacy.matches(p));
        let has_modern = paths.iter().any(|p| rule.modern.matches(p));
        if has_legacy && has_modern {
            let mut diag = from_finding(&rule.finding);
            if let PathRule::Exact(legacy) = rule.legacy {
                diag = diag.with_path(legacy);
            }
            out.push(diag);
        }
    }

    if let Some(rule) = &profile.wrong_folder {
        let found = paths.iter().any(|p| rule.found.matches(p));
        let own = paths.iter().any(|p| rule.own.matches(p));
        if found && !own {
            out.push(from_finding(&rule.finding));
        }
    }

    if let Some(rule) = &profile.wrong_extension {
        for path in paths
            .iter()
            .filter(|p| p.starts_with(rule.dir_prefix) && !p.ends_with(rule.suffix))
        {
            out.push(
                Diagnostic::new(
                    rule.code,
                    format!("{} should end with {} (found {}).", rule.subject, rule.suffix, path),
                )
                .with_suggestion(rule.suggestion)
                .with_path(*path),
            );
        }
    }
}

fn mixed_tools(tool: SimulatorToolId, paths: &[&str]) -> Option<Diagnostic> {
    let others: Vec<&str> = PROFILES
        .iter()
        .filter(|p| p.tool != tool)
        .filter(|p| paths.iter().any(|path| p.is_configured_by(path)))
        .map(|p| p.tool.label())
        .collect();
    if others.is_empty() {
        return None;
    }
    Some(
        Diagnostic::new(
            DiagnosticCode::MixedTools,
            format!("Instruction files for other tools were detected: {}.", others.join(", ")),
        )
        .with_suggestion("Confirm you are validating the correct tool and file layout."),
    )
}

/// Static naming, placement, and import checks for `input.tool`.
pub fn compute_instruction_diagnostics(input: &DiagnosticsInput) -> InstructionDiagnostics {
    let index = input.tree.index();
    let paths: Vec<&str> = index.paths().collect();
    let profile = rules::profile(input.tool);
    let mut diagnostics = Vec::new();

    case_diagnostics(&paths, &mut diagnostics);

    match profile.resolution {
        Resolution::Stacking {
            file_name,
            override_name,
            imports,
        } => {
            stacking_diagnostics(
                profile,
                file_name,
                override_name,
                &index,
                &paths,
                input.cwd.as_deref(),
                &mut diagnostics,
            );
            if imports {
                let entries: Vec<&str> = paths
                    .iter()
                    .copied()
                    .filter(|p| is_named_file(p, file_name))
                    .collect();
                let result = resolve_claude_imports(&index, &entries);
                diagnostics.extend(result.issues.iter().map(import_diagnostic));
            }
        }
        Resolution::Tiered(_) => {
            if !paths.iter().any(|p| profile.is_primary(p)) {
                diagnostics.push(from_finding(&profile.missing));
            }
        }
    }

    placement_diagnostics(profile, &paths, &mut diagnostics);
    diagnostics.extend(mixed_tools(input.tool, &paths));

    log::debug!(
        "{} diagnostics for {} over {} paths",
        diagnostics.len(),
        input.tool,
        paths.len()
    );
    InstructionDiagnostics {
        tool: input.tool,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RepoTreeFile, Severity};
    use pretty_assertions::assert_eq;

    fn run(tool: SimulatorToolId, cwd: Option<&str>, files: &[(&str, &str)]) -> InstructionDiagnostics {
        compute_instruction_diagnostics(&DiagnosticsInput {
            tool,
            tree: RepoTree::from_files(files.iter().map(|(p, c)| RepoTreeFile::new(*p, *c)).collect()),
            cwd: cwd.map(str::to_string),
        })
    }

    fn codes(result: &InstructionDiagnostics) -> Vec<&str> {
        result.diagnostics.iter().map(|d| d.code.as_str()).collect()
    }

    #[test]
    fn test_copilot_cli_wrong_folder_and_extension() {
        let result = run(
            SimulatorToolId::CopilotCli,
            None,
            &[
                (".github/instructions/web.instructions.md", ""),
                (".github/copilot-instructions/notes.md", ""),
            ],
        );
        assert_eq!(
            codes(&result),
            vec![
                "missing.copilot-cli",
                "wrong-folder.copilot-cli",
                "wrong-extension.copilot-cli",
                "mixed-tools"
            ]
        );
        let ext = &result.diagnostics[2];
        assert_eq!(ext.path.as_deref(), Some(".github/copilot-instructions/notes.md"));
        assert_eq!(
            ext.message,
            "Scoped Copilot CLI instructions should end with .instructions.md (found .github/copilot-instructions/notes.md)."
        );
        assert!(result.diagnostics[3].message.contains("GitHub Copilot"));
    }

    #[test]
    fn test_codex_case_mismatch_reported_per_path() {
        let result = run(
            SimulatorToolId::CodexCli,
            Some(""),
            &[("agents.md", ""), ("apps/Agents.md", "")],
        );
        let mismatches: Vec<_> = result
            .diagnostics
            .iter()
            .filter(|d| d.code == "case-mismatch.agents")
            .collect();
        assert_eq!(mismatches.len(), 2);
        assert_eq!(mismatches[1].expected_path.as_deref(), Some("apps/AGENTS.md"));
        assert_eq!(mismatches[0].severity, Severity::Error);
        assert!(codes(&result).contains(&"missing.agents"));
    }

    #[test]
    fn test_override_without_base_once_per_override() {
        let result = run(
            SimulatorToolId::CodexCli,
            Some("apps/web"),
            &[
                ("AGENTS.md", ""),
                ("apps/web/AGENTS.override.md", ""),
                ("docs/AGENTS.override.md", ""),
                ("docs/AGENTS.md", ""),
            ],
        );
        let overrides: Vec<_> = result
            .diagnostics
            .iter()
            .filter(|d| d.code == "override-without-base")
            .collect();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].path.as_deref(), Some("apps/web/AGENTS.override.md"));
        assert_eq!(overrides[0].expected_path.as_deref(), Some("apps/web/AGENTS.md"));
        assert_eq!(overrides[0].severity, Severity::Warning);
    }

    #[test]
    fn test_missing_root_and_cwd_handling() {
        let nested = [("apps/web/GEMINI.md", "")];
        let result = run(SimulatorToolId::GeminiCli, None, &nested);
        assert_eq!(codes(&result), vec!["missing.gemini-root", "missing-cwd"]);

        let result = run(SimulatorToolId::GeminiCli, Some("docs"), &nested);
        assert_eq!(codes(&result), vec!["missing.gemini-root", "no-ancestor-instructions"]);
        assert_eq!(
            result.diagnostics[1].message,
            "No GEMINI.md files are in the cwd ancestry. Gemini CLI may not load any instructions."
        );

        let result = run(SimulatorToolId::GeminiCli, Some("apps/web/src"), &nested);
        assert_eq!(codes(&result), vec!["missing.gemini-root"]);
    }

    #[test]
    fn test_claude_import_issues() {
        let result = run(
            SimulatorToolId::ClaudeCode,
            Some(""),
            &[
                ("CLAUDE.md", "@docs/missing.md\n@../outside.md\n@a.md"),
                ("a.md", "@CLAUDE.md"),
            ],
        );
        let imports: Vec<_> = result
            .diagnostics
            .iter()
            .filter(|d| d.code.starts_with("claude-import."))
            .map(|d| (d.code.as_str(), d.severity, d.path.as_deref()))
            .collect();
        assert_eq!(
            imports,
            vec![
                ("claude-import.missing", Severity::Warning, Some("CLAUDE.md")),
                ("claude-import.outside-root", Severity::Error, Some("CLAUDE.md")),
                ("claude-import.circular", Severity::Error, Some("a.md")),
            ]
        );
    }

    #[test]
    fn test_claude_cycle_deeper_than_load_limit() {
        let result = run(
            SimulatorToolId::ClaudeCode,
            Some(""),
            &[
                ("CLAUDE.md", "@1.md"),
                ("1.md", "@2.md"),
                ("2.md", "@3.md"),
                ("3.md", "@4.md"),
                ("4.md", "@5.md"),
                ("5.md", "@6.md"),
                ("6.md", "@1.md"),
            ],
        );
        let imports: Vec<_> = result
            .diagnostics
            .iter()
            .filter(|d| d.code.starts_with("claude-import."))
            .map(|d| (d.code.as_str(), d.path.as_deref(), d.expected_path.as_deref()))
            .collect();
        assert_eq!(imports, vec![("claude-import.circular", Some("6.md"), Some("1.md"))]);
        assert!(result.has_errors());
    }

    #[test]
    fn test_cursor_deprecated_and_wrong_extension() {
        let result = run(
            SimulatorToolId::Cursor,
            None,
            &[(".cursorrules", ""), (".cursor/rules/general.mdc", ""), (".cursor/rules/notes.md", "")],
        );
        assert_eq!(codes(&result), vec!["deprecated.cursorrules", "wrong-extension.cursor"]);
        assert_eq!(result.diagnostics[0].path.as_deref(), Some(".cursorrules"));
    }

    #[test]
    fn test_clean_github_copilot_setup_has_no_diagnostics() {
        let result = run(
            SimulatorToolId::GithubCopilot,
            None,
            &[
                (".github/copilot-instructions.md", ""),
                (".github/instructions/web.instructions.md", ""),
            ],
        );
        assert!(result.diagnostics.is_empty());
        assert!(!result.has_errors());
    }

    #[test]
    fn test_copilot_root_case_mismatch() {
        let result = run(SimulatorToolId::GithubCopilot, None, &[(".github/Copilot-Instructions.md", "")]);
        assert_eq!(codes(&result), vec!["case-mismatch.copilot-root", "missing.github-copilot"]);
        assert!(result.has_errors());
    }
}
