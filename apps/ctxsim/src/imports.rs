//! Claude Code `@path` import graph.
//!
//! Memory files may pull in other files with `@path` tokens. Imports are
//! resolved relative to the importing file (a leading `/` means the
//! repository root). Problems are found with an unbounded three-color
//! walk; loading follows imports depth-first up to `MAX_IMPORT_DEPTH` hops.

use crate::models::TreeIndex;
use crate::utils::{dir_name, normalize_path};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

pub const MAX_IMPORT_DEPTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaudeImportIssueKind {
    Missing,
    OutsideRoot,
    Circular,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeImportIssue {
    pub kind: ClaudeImportIssueKind,
    pub source_path: String,
    pub raw_path: String,
    pub resolved_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaudeImportResult {
    /// Imported files in depth-first pre-order, each once.
    pub imported: Vec<String>,
    pub issues: Vec<ClaudeImportIssue>,
}

fn import_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:^|\s)@([^\s"'`<>]+)"#).unwrap_or_else(|_| unreachable!("static pattern"))
    })
}

fn sanitize_token(token: &str) -> &str {
    token
        .trim()
        .trim_start_matches(['(', '"', '\'', '`'])
        .trim_end_matches([')', '"', '\'', '`', ',', '.', ';', ':'])
}

/// Unique `@path` tokens in order of appearance, ignoring fenced code.
pub fn extract_imports(content: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut in_fence = false;
    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        for caps in import_token_re().captures_iter(line) {
            let cleaned = sanitize_token(caps.get(1).map_or("", |m| m.as_str()));
            if !cleaned.is_empty() && !out.iter().any(|seen| seen == cleaned) {
                out.push(cleaned.to_string());
            }
        }
    }
    out
}

/// Resolve an import against the importing file. Returns the repository
/// path and whether the import escapes the root.
pub fn resolve_import_path(source_path: &str, raw: &str) -> (String, bool) {
    let cleaned = sanitize_token(raw).replace('\\', "/");
    if cleaned.is_empty() {
        return (String::new(), false);
    }
    if cleaned == "~" || cleaned.starts_with("~/") {
        return (cleaned, true);
    }
    let rooted = cleaned.starts_with('/');
    let source = normalize_path(source_path);
    let base = if rooted { "" } else { dir_name(&source) };
    let mut stack: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    let mut outside_root = false;
    for segment in cleaned.trim_start_matches('/').split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if stack.pop().is_none() {
                    outside_root = true;
                }
            }
            other => stack.push(other),
        }
    }
    (stack.join("/"), outside_root)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// On the current DFS path.
    Gray,
    /// Fully expanded.
    Black,
}

struct Frame {
    path: String,
    imports: std::vec::IntoIter<String>,
}

impl Frame {
    fn open(index: &TreeIndex<'_>, path: String) -> Self {
        let imports = extract_imports(index.content(&path).unwrap_or_default()).into_iter();
        Self { path, imports }
    }
}

/// Walk every import reachable from `entries`, without a hop limit, and
/// report missing, escaping, and circular imports. `imported` lists each
/// reachable file once in depth-first pre-order.
pub fn resolve_claude_imports<S: AsRef<str>>(index: &TreeIndex<'_>, entries: &[S]) -> ClaudeImportResult {
    let mut colors: HashMap<String, Color> = HashMap::new();
    let mut result = ClaudeImportResult::default();
    for entry in entries {
        let entry = normalize_path(entry.as_ref());
        if entry.is_empty() || !index.has(&entry) || colors.contains_key(&entry) {
            continue;
        }
        colors.insert(entry.clone(), Color::Gray);
        let mut stack = vec![Frame::open(index, entry)];
        while let Some(frame) = stack.last_mut() {
            let Some(raw) = frame.imports.next() else {
                colors.insert(frame.path.clone(), Color::Black);
                stack.pop();
                continue;
            };
            let source = frame.path.clone();
            let (resolved, outside_root) = resolve_import_path(&source, &raw);
            if resolved.is_empty() {
                continue;
            }
            let kind = if outside_root {
                Some(ClaudeImportIssueKind::OutsideRoot)
            } else if colors.get(&resolved) == Some(&Color::Gray) {
                Some(ClaudeImportIssueKind::Circular)
            } else if !index.has(&resolved) {
                Some(ClaudeImportIssueKind::Missing)
            } else {
                None
            };
            if let Some(kind) = kind {
                log::debug!("claude import {:?}: {} -> {}", kind, source, raw);
                result.issues.push(ClaudeImportIssue {
                    kind,
                    source_path: source,
                    raw_path: raw,
                    resolved_path: resolved,
                });
                continue;
            }
            if colors.contains_key(&resolved) {
                continue;
            }
            colors.insert(resolved.clone(), Color::Gray);
            result.imported.push(resolved.clone());
            stack.push(Frame::open(index, resolved));
        }
    }
    result
}

/// Splices imports into a load order, shared across several entry files so
/// a file imported from two memory files is loaded once.
///
/// Expansion stops `MAX_IMPORT_DEPTH` hops from the entry. A file first
/// reached near the limit is expanded again when a shorter path to it shows
/// up later. Problems are not reported here; see `resolve_claude_imports`.
pub struct ImportGraph<'t, 'a> {
    index: &'t TreeIndex<'a>,
    /// Shallowest hop count each file has been expanded at.
    depths: HashMap<String, usize>,
    spliced: Vec<(String, String)>,
}

impl<'t, 'a> ImportGraph<'t, 'a> {
    pub fn new(index: &'t TreeIndex<'a>) -> Self {
        Self {
            index,
            depths: HashMap::new(),
            spliced: Vec::new(),
        }
    }

    /// Walk the imports of one entry file. Returns `(path, importer)` for
    /// every file newly imported by this entry, in pre-order.
    pub fn expand(&mut self, entry: &str) -> Vec<(String, String)> {
        let entry = normalize_path(entry);
        let before = self.spliced.len();
        if entry.is_empty() || !self.index.has(&entry) || self.depths.get(&entry) == Some(&0) {
            return Vec::new();
        }
        self.depths.insert(entry.clone(), 0);
        self.visit(&entry, 0);
        self.spliced[before..].to_vec()
    }

    fn visit(&mut self, source: &str, depth: usize) {
        let hop = depth + 1;
        if hop > MAX_IMPORT_DEPTH {
            return;
        }
        let content = self.index.content(source).unwrap_or_default();
        for raw in extract_imports(content) {
            let (resolved, outside_root) = resolve_import_path(source, &raw);
            if resolved.is_empty() || outside_root || !self.index.has(&resolved) {
                continue;
            }
            match self.depths.get(&resolved) {
                Some(&seen) if seen <= hop => continue,
                Some(_) => {}
                None => self.spliced.push((resolved.clone(), source.to_string())),
            }
            self.depths.insert(resolved.clone(), hop);
            self.visit(&resolved, hop);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RepoTree, RepoTreeFile};
    use pretty_assertions::assert_eq;

    fn tree(files: &[(&str, &str)]) -> RepoTree {
        RepoTree::from_files(files.iter().map(|(p, c)| RepoTreeFile::new(*p, *c)).collect())
    }

    #[test]
    fn test_extract_skips_fences_and_emails() {
        let content = "See @docs/a.md, and @(b.md).\nmail me at me@example.com\n```\n@ignored.md\n```\n@docs/a.md again";
        assert_eq!(extract_imports(content), vec!["docs/a.md", "b.md"]);
    }

    #[test]
    fn test_resolve_relative_rooted_and_escaping() {
        assert_eq!(resolve_import_path("apps/CLAUDE.md", "notes.md"), ("apps/notes.md".into(), false));
        assert_eq!(resolve_import_path("apps/CLAUDE.md", "/notes.md"), ("notes.md".into(), false));
        assert_eq!(resolve_import_path("apps/CLAUDE.md", "../docs/x.md"), ("docs/x.md".into(), false));
        assert!(resolve_import_path("CLAUDE.md", "../x.md").1);
        assert!(resolve_import_path("CLAUDE.md", "~/.claude/mine.md").1);
    }

    #[test]
    fn test_depth_first_pre_order() {
        let tree = tree(&[
            ("CLAUDE.md", "@docs/overview.md"),
            ("docs/overview.md", "@../prompts/shared.md"),
            ("prompts/shared.md", "@base.md"),
            ("prompts/base.md", "base"),
        ]);
        let index = tree.index();
        let result = resolve_claude_imports(&index, &["CLAUDE.md"]);
        assert_eq!(
            result.imported,
            vec!["docs/overview.md", "prompts/shared.md", "prompts/base.md"]
        );
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_issues_for_missing_outside_and_cycles() {
        let tree = tree(&[
            ("CLAUDE.md", "@a.md @missing.md @../up.md"),
            ("a.md", "@b.md"),
            ("b.md", "@a.md"),
        ]);
        let index = tree.index();
        let result = resolve_claude_imports(&index, &["CLAUDE.md"]);
        let kinds: Vec<_> = result.issues.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ClaudeImportIssueKind::Circular,
                ClaudeImportIssueKind::Missing,
                ClaudeImportIssueKind::OutsideRoot
            ]
        );
        assert_eq!(result.issues[0].source_path, "b.md");
        assert_eq!(result.issues[0].resolved_path, "a.md");
    }

    #[test]
    fn test_shared_import_is_not_a_cycle() {
        let tree = tree(&[
            ("CLAUDE.md", "@shared.md"),
            ("apps/CLAUDE.md", "@/shared.md"),
            ("shared.md", "shared"),
        ]);
        let index = tree.index();
        let mut graph = ImportGraph::new(&index);
        assert_eq!(
            graph.expand("CLAUDE.md"),
            vec![("shared.md".to_string(), "CLAUDE.md".to_string())]
        );
        assert!(graph.expand("apps/CLAUDE.md").is_empty());
        assert!(resolve_claude_imports(&index, &["CLAUDE.md", "apps/CLAUDE.md"]).issues.is_empty());
    }

    fn chain(head: &str, tail: &str) -> RepoTree {
        let mut files = vec![("CLAUDE.md".to_string(), head.to_string())];
        for n in 1..=6 {
            let body = if n < 6 { format!("@{}.md", n + 1) } else { tail.to_string() };
            files.push((format!("{}.md", n), body));
        }
        RepoTree::from_files(files.iter().map(|(p, c)| RepoTreeFile::new(p.as_str(), c.as_str())).collect())
    }

    fn spliced(index: &TreeIndex<'_>) -> Vec<String> {
        ImportGraph::new(index)
            .expand("CLAUDE.md")
            .into_iter()
            .map(|(path, _)| path)
            .collect()
    }

    #[test]
    fn test_depth_limit_stops_splicing() {
        let tree = chain("@1.md", "six");
        let index = tree.index();
        assert_eq!(spliced(&index), vec!["1.md", "2.md", "3.md", "4.md", "5.md"]);
    }

    #[test]
    fn test_shorter_path_reexpands_file_reached_at_limit() {
        let tree = chain("@1.md @5.md", "six");
        let index = tree.index();
        let mut graph = ImportGraph::new(&index);
        let out = graph.expand("CLAUDE.md");
        let paths: Vec<&str> = out.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["1.md", "2.md", "3.md", "4.md", "5.md", "6.md"]);
        assert_eq!(out[5].1, "5.md");
    }

    #[test]
    fn test_deep_cycle_and_missing_are_reported() {
        let tree = chain("@1.md", "@1.md @gone.md");
        let index = tree.index();
        let result = resolve_claude_imports(&index, &["CLAUDE.md"]);
        assert_eq!(result.imported, vec!["1.md", "2.md", "3.md", "4.md", "5.md", "6.md"]);
        let issues: Vec<_> = result
            .issues
            .iter()
            .map(|i| (i.kind, i.source_path.as_str(), i.resolved_path.as_str()))
            .collect();
        assert_eq!(
            issues,
            vec![
                (ClaudeImportIssueKind::Circular, "6.md", "1.md"),
                (ClaudeImportIssueKind::Missing, "6.md", "gone.md"),
            ]
        );
        assert_eq!(spliced(&index), vec!["1.md", "2.md", "3.md", "4.md", "5.md"]);
    }
}
