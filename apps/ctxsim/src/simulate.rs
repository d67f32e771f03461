//! Context resolution: which instruction files a tool loads for a working
//! directory, which of its files exist but do not apply, and which
//! structural warnings the tree raises.
//!
//! Stacking tools walk the ancestor chain from the repository root down to
//! `cwd`; tiered tools load independent file groups in tier order.

use crate::front_matter::{parse_front_matter, ApplyTo};
use crate::imports::ImportGraph;
use crate::models::{
    Diagnostic, DiagnosticCode, LoadedFile, RepoTree, ShadowedFile, SimulatorToolId, TreeIndex, Warning,
};
use crate::rules::{self, Resolution, Tier, ToolProfile};
use crate::utils::{ancestor_dirs, dir_name, join_dir_file, normalize_path};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

pub const LARGE_TREE_THRESHOLD: usize = 25;
pub const CURSOR_RULES_THRESHOLD: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInput {
    pub tool: SimulatorToolId,
    /// Repository-relative working directory; `""` is the root.
    #[serde(default)]
    pub cwd: String,
    pub tree: RepoTree,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub loaded: Vec<LoadedFile>,
    pub shadowed: Vec<ShadowedFile>,
    pub warnings: Vec<Warning>,
}

fn dir_label(dir: &str) -> &str {
    if dir.is_empty() {
        "repo root"
    } else {
        dir
    }
}

/// Accumulates loaded and shadowed files, keeping each path once.
#[derive(Default)]
struct Resolved {
    loaded: Vec<LoadedFile>,
    shadowed: Vec<ShadowedFile>,
    seen: HashSet<String>,
    warnings: Vec<Warning>,
}

impl Resolved {
    fn load(&mut self, path: &str, scope: Option<String>, reason: String) {
        if self.seen.insert(path.to_string()) {
            self.loaded.push(LoadedFile {
                path: path.to_string(),
                scope,
                reason,
            });
        }
    }

    fn shadow(&mut self, path: &str, reason: String) {
        if self.seen.insert(path.to_string()) {
            self.shadowed.push(ShadowedFile {
                path: path.to_string(),
                scope: Some(dir_label(dir_name(path)).to_string()),
                reason,
            });
        }
    }
}

fn resolve_stacking(
    profile: &ToolProfile,
    index: &TreeIndex<'_>,
    cwd: &str,
    file_name: &str,
    override_name: Option<&str>,
    imports: bool,
    out: &mut Resolved,
) {
    let label = profile.tool.label();
    let mut graph = ImportGraph::new(index);
    for dir in ancestor_dirs(cwd) {
        let base = join_dir_file(&dir, file_name);
        let has_base = index.has(&base);
        let scope = (!dir.is_empty()).then(|| dir.clone());

        let mut entry: Option<String> = None;
        if let Some(override_name) = override_name {
            let over = join_dir_file(&dir, override_name);
            if index.has(&over) {
                out.load(
                    &over,
                    scope.clone(),
                    format!("{} replaces {} in {}", override_name, file_name, dir_label(&dir)),
                );
                if has_base {
                    out.shadow(
                        &base,
                        format!("Replaced by {} in the same directory.", override_name),
                    );
                } else {
                    out.warnings.push(
                        Diagnostic::new(
                            DiagnosticCode::OverrideWithoutBase,
                            format!(
                                "{} has no sibling {}; {} still applies it, but the base file is expected alongside.",
                                over, file_name, label
                            ),
                        )
                        .with_suggestion(format!("Add {} next to the override.", base))
                        .with_path(over.clone())
                        .with_expected_path(base.clone()),
                    );
                }
                entry = Some(over);
            }
        }
        if entry.is_none() && has_base {
            out.load(&base, scope, format!("{} in {}", file_name, dir_label(&dir)));
            entry = Some(base);
        }

        if let (true, Some(entry)) = (imports, entry) {
            for (path, importer) in graph.expand(&entry) {
                out.load(&path, None, format!("imported by {}", importer));
            }
        }
    }

    let chain: HashSet<String> = ancestor_dirs(cwd).into_iter().collect();
    for path in index.paths() {
        if profile.is_role_file(path) && !chain.contains(dir_name(path)) {
            out.shadow(
                path,
                format!(
                    "Outside current directory; {} loads {} files from repo root to cwd.",
                    label, file_name
                ),
            );
        }
    }
}

fn resolve_tiered(tiers: &[Tier], index: &TreeIndex<'_>, cwd: &str, out: &mut Resolved) {
    for tier in tiers {
        let members: Vec<&str> = index.paths().filter(|p| tier.rule.matches(p)).collect();
        for path in members {
            if !tier.scoped {
                out.load(path, None, tier.reason.to_string());
                continue;
            }
            let globs = index
                .content(path)
                .and_then(parse_front_matter)
                .map(|fm| fm.apply_to)
                .unwrap_or_default();
            if globs.is_empty() {
                log::debug!("{}: no applyTo front matter; not loaded", path);
                continue;
            }
            if ApplyTo::new(&globs).applies_under(cwd, index.paths()) {
                out.load(path, Some(globs.join(", ")), tier.reason.to_string());
            } else {
                log::debug!("{}: applyTo {:?} selects nothing under '{}'", path, globs, cwd);
            }
        }
    }
}

/// Tree-level risks, independent of the selected tool.
fn tree_warnings(index: &TreeIndex<'_>) -> Vec<Warning> {
    let mut out = Vec::new();
    let total = index.len();
    if total > LARGE_TREE_THRESHOLD {
        out.push(Diagnostic::new(
            DiagnosticCode::ScanRiskLargeTree,
            format!("Tree contains {} files; downward scans may explode context.", total),
        ));
    }
    let cursor_rules = index
        .paths()
        .filter(|p| p.starts_with(".cursor/rules/"))
        .count();
    if cursor_rules > CURSOR_RULES_THRESHOLD {
        out.push(
            Diagnostic::new(
                DiagnosticCode::ScanRiskCursorRules,
                format!(".cursor/rules contains {} files.", cursor_rules),
            )
            .with_path(".cursor/rules"),
        );
    }
    if let Some(rule) = rules::profile(SimulatorToolId::Cursor).deprecated {
        let has_legacy = index.paths().any(|p| rule.legacy.matches(p));
        if has_legacy && cursor_rules > 0 {
            out.push(
                Diagnostic::new(rule.finding.code, rule.finding.message)
                    .with_suggestion(rule.finding.suggestion)
                    .with_path(".cursorrules"),
            );
        }
    }
    out
}

/// Compute the ordered files a tool loads for `input.cwd`.
pub fn simulate_context_resolution(input: &SimulationInput) -> SimulationResult {
    let index = input.tree.index();
    let cwd = normalize_path(&input.cwd);
    let profile = rules::profile(input.tool);

    let mut out = Resolved {
        warnings: tree_warnings(&index),
        ..Resolved::default()
    };
    match profile.resolution {
        Resolution::Stacking {
            file_name,
            override_name,
            imports,
        } => resolve_stacking(profile, &index, &cwd, file_name, override_name, imports, &mut out),
        Resolution::Tiered(tiers) => resolve_tiered(tiers, &index, &cwd, &mut out),
    }

    if out.loaded.is_empty() {
        let mut w = Diagnostic::new(
            DiagnosticCode::NoInstructions,
            format!(
                "No {} instruction files apply to {}.",
                profile.tool.label(),
                dir_label(&cwd)
            ),
        )
        .with_suggestion(profile.missing.suggestion);
        if let Some(expected) = profile.missing.expected_path {
            w = w.with_expected_path(expected);
        }
        out.warnings.push(w);
    }

    log::debug!(
        "simulated {} at '{}': {} loaded, {} shadowed, {} warnings",
        profile.tool,
        cwd,
        out.loaded.len(),
        out.shadowed.len(),
        out.warnings.len()
    );
    SimulationResult {
        loaded: out.loaded,
        shadowed: out.shadowed,
        warnings: out.warnings,
    }
}

/// Distinct warning codes, for set comparisons.
pub fn warning_codes(result: &SimulationResult) -> BTreeSet<String> {
    result.warnings.iter().map(|w| w.code.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RepoTreeFile, Severity};
    use pretty_assertions::assert_eq;

    fn run(tool: SimulatorToolId, cwd: &str, files: &[(&str, &str)]) -> SimulationResult {
        let tree = RepoTree::from_files(files.iter().map(|(p, c)| RepoTreeFile::new(*p, *c)).collect());
        simulate_context_resolution(&SimulationInput {
            tool,
            cwd: cwd.to_string(),
            tree,
        })
    }

    fn loaded(result: &SimulationResult) -> Vec<&str> {
        result.loaded.iter().map(|f| f.path.as_str()).collect()
    }

    fn shadowed(result: &SimulationResult) -> Vec<&str> {
        result.shadowed.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn test_codex_stacks_root_to_cwd_and_shadows_siblings() {
        let result = run(
            SimulatorToolId::CodexCli,
            "apps/web",
            &[
                ("AGENTS.md", ""),
                ("apps/web/AGENTS.md", ""),
                ("apps/api/AGENTS.md", ""),
                ("README.md", ""),
            ],
        );
        assert_eq!(loaded(&result), vec!["AGENTS.md", "apps/web/AGENTS.md"]);
        assert_eq!(shadowed(&result), vec!["apps/api/AGENTS.md"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_codex_override_replaces_base() {
        let result = run(
            SimulatorToolId::CodexCli,
            "docs",
            &[
                ("AGENTS.md", ""),
                ("docs/AGENTS.md", ""),
                ("docs/AGENTS.override.md", ""),
            ],
        );
        assert_eq!(loaded(&result), vec!["AGENTS.md", "docs/AGENTS.override.md"]);
        assert_eq!(shadowed(&result), vec!["docs/AGENTS.md"]);
    }

    #[test]
    fn test_codex_override_without_base_warns_once() {
        let result = run(
            SimulatorToolId::CodexCli,
            "docs",
            &[("AGENTS.md", ""), ("docs/AGENTS.override.md", "")],
        );
        let hits: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.code == "override-without-base")
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].expected_path.as_deref(), Some("docs/AGENTS.md"));
        assert_eq!(loaded(&result), vec!["AGENTS.md", "docs/AGENTS.override.md"]);
    }

    #[test]
    fn test_claude_splices_imports_after_each_memory_file() {
        let result = run(
            SimulatorToolId::ClaudeCode,
            "",
            &[
                ("CLAUDE.md", "@docs/overview.md\n@prompts/base.md"),
                ("docs/overview.md", "@../prompts/shared.md"),
                ("prompts/base.md", "Base instructions."),
                ("prompts/shared.md", "Shared instructions."),
            ],
        );
        assert_eq!(
            loaded(&result),
            vec!["CLAUDE.md", "docs/overview.md", "prompts/shared.md", "prompts/base.md"]
        );
        assert!(result.loaded[1].reason.starts_with("imported by CLAUDE.md"));
    }

    #[test]
    fn test_claude_shorter_import_path_loads_past_deep_chain() {
        let result = run(
            SimulatorToolId::ClaudeCode,
            "",
            &[
                ("CLAUDE.md", "@1.md @5.md"),
                ("1.md", "@2.md"),
                ("2.md", "@3.md"),
                ("3.md", "@4.md"),
                ("4.md", "@5.md"),
                ("5.md", "@6.md"),
                ("6.md", "six"),
            ],
        );
        assert_eq!(
            loaded(&result),
            vec!["CLAUDE.md", "1.md", "2.md", "3.md", "4.md", "5.md", "6.md"]
        );
        assert_eq!(result.loaded[6].reason, "imported by 5.md");
    }

    #[test]
    fn test_gemini_nested_file_outside_cwd_is_shadowed() {
        let result = run(
            SimulatorToolId::GeminiCli,
            "",
            &[("GEMINI.md", ""), ("packages/core/GEMINI.md", "")],
        );
        assert_eq!(loaded(&result), vec!["GEMINI.md"]);
        assert_eq!(shadowed(&result), vec!["packages/core/GEMINI.md"]);
    }

    #[test]
    fn test_github_copilot_applies_scoped_files_by_glob() {
        let files = [
            (".github/copilot-instructions.md", "# Repo"),
            (".github/instructions/apps-web.instructions.md", "---\napplyTo: \"apps/web/**\"\n---\nWeb"),
            (".github/instructions/api.instructions.md", "---\napplyTo: \"apps/api/**\"\n---\nApi"),
            (".github/instructions/bare.instructions.md", "no front matter"),
            ("apps/web/page.tsx", ""),
        ];
        let result = run(SimulatorToolId::GithubCopilot, "apps/web", &files);
        assert_eq!(
            loaded(&result),
            vec![
                ".github/copilot-instructions.md",
                ".github/instructions/apps-web.instructions.md"
            ]
        );
        assert_eq!(result.loaded[1].scope.as_deref(), Some("apps/web/**"));
        assert!(result.shadowed.is_empty());
    }

    #[test]
    fn test_copilot_cli_tier_order() {
        let files = [
            (".github/agents/release.agent.md", ""),
            (".github/copilot-instructions/apps-web.instructions.md", "---\napplyTo: \"**\"\n---\n"),
            (".github/copilot-instructions.md", ""),
        ];
        let result = run(SimulatorToolId::CopilotCli, "apps/web", &files);
        assert_eq!(
            loaded(&result),
            vec![
                ".github/copilot-instructions.md",
                ".github/copilot-instructions/apps-web.instructions.md",
                ".github/agents/release.agent.md"
            ]
        );
    }

    #[test]
    fn test_cursor_rules_then_legacy_with_reasons() {
        let result = run(
            SimulatorToolId::Cursor,
            "",
            &[
                (".cursor/rules/typing.mdc", ""),
                (".cursor/rules/general.mdc", ""),
                (".cursorrules", ""),
            ],
        );
        assert_eq!(
            result.loaded,
            vec![
                LoadedFile {
                    path: ".cursor/rules/general.mdc".into(),
                    scope: None,
                    reason: "cursor rule (.cursor/rules/*.mdc)".into()
                },
                LoadedFile {
                    path: ".cursor/rules/typing.mdc".into(),
                    scope: None,
                    reason: "cursor rule (.cursor/rules/*.mdc)".into()
                },
                LoadedFile {
                    path: ".cursorrules".into(),
                    scope: None,
                    reason: "legacy cursor rules (.cursorrules, deprecated)".into()
                },
            ]
        );
        assert!(warning_codes(&result).contains("deprecated.cursorrules"));
    }

    #[test]
    fn test_empty_tree_warns_no_instructions() {
        let result = run(SimulatorToolId::ClaudeCode, "src", &[("src/main.rs", "")]);
        assert!(result.loaded.is_empty());
        assert_eq!(
            warning_codes(&result).into_iter().collect::<Vec<_>>(),
            vec!["no-instructions"]
        );
        assert_eq!(result.warnings[0].severity, Severity::Warning);
        assert_eq!(
            result.warnings[0].code,
            DiagnosticCode::NoInstructions.as_str()
        );
    }

    #[test]
    fn test_scan_risk_warnings() {
        let mut files: Vec<(String, String)> = (0..30)
            .map(|i| (format!("src/file{i}.rs"), String::new()))
            .collect();
        files.extend((0..11).map(|i| (format!(".cursor/rules/r{i}.mdc"), String::new())));
        files.push(("AGENTS.md".into(), String::new()));
        let borrowed: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
        let result = run(SimulatorToolId::CodexCli, "", &borrowed);
        let codes = warning_codes(&result);
        assert!(codes.contains("scan-risk.large-tree"));
        assert!(codes.contains("scan-risk.cursor-rules"));
    }

    #[test]
    fn test_windows_cwd_matches_posix() {
        let files = [("AGENTS.md", ""), ("apps/web/AGENTS.md", "")];
        let windows = run(SimulatorToolId::CodexCli, "apps\\web", &files);
        let posix = run(SimulatorToolId::CodexCli, "apps/web", &files);
        assert_eq!(windows, posix);
    }
}
