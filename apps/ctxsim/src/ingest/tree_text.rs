//! Pasted path listings: plain path lists, `tree` output (unicode or ASCII
//! markers), and `ls -R` output.

use crate::models::RepoTree;
use crate::utils::{normalize_path, sanitize_repo_path};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoPathParseIssue {
    /// 1-based line number in the input.
    pub line: usize,
    pub message: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoPathParseResult {
    /// Unique paths in first-seen order.
    pub paths: Vec<String>,
    pub issues: Vec<RepoPathParseIssue>,
}

struct Patterns {
    marker: Regex,
    unicode_line: Regex,
    ascii_line: Regex,
    ls_header: Regex,
    summary: Regex,
    windows_banner: Regex,
    ls_error: Regex,
    depth_unit: Regex,
    drive_root: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |src: &str| Regex::new(src).unwrap_or_else(|_| unreachable!("static pattern"));
        Patterns {
            marker: re(r"(?:├|└)[─-]{2,}|\+--|\\--|\|--"),
            unicode_line: re(r"^(.*?)(?:├|└)[─-]{2,}\s+(.+)$"),
            ascii_line: re(r"^(.*?)(?:\+--|\\--|\|--)\s+(.+)$"),
            ls_header: re(r"^(.+):$"),
            summary: re(r"(?i)^(?:\d+\s+directories?,\s+\d+\s+files?|\d+\s+files?)$"),
            windows_banner: re(r"(?i)^(?:Folder PATH listing|Volume serial number is)"),
            ls_error: re(r"(?i)^ls:\s+"),
            depth_unit: re(r"(?:\|   |│   |    )"),
            drive_root: re(r"^[A-Za-z]:\.$"),
        }
    })
}

struct TreeNode {
    depth: usize,
    name: String,
    line: usize,
    is_dir_hint: bool,
}

fn parse_tree_line(raw: &str, line: usize) -> Option<TreeNode> {
    let p = patterns();
    if !p.marker.is_match(raw) {
        return None;
    }
    let caps = p
        .unicode_line
        .captures(raw)
        .or_else(|| p.ascii_line.captures(raw))?;
    let prefix = caps.get(1).map_or("", |m| m.as_str()).replace('\t', "    ");
    let cleaned = caps.get(2).map_or("", |m| m.as_str()).trim();
    let name = cleaned.trim_end_matches(['/', '\\']);
    if name.is_empty() || name == "." {
        return None;
    }
    Some(TreeNode {
        depth: p.depth_unit.find_iter(&prefix).count(),
        name: name.to_string(),
        line,
        is_dir_hint: name.len() != cleaned.len(),
    })
}

fn normalize_repo_root(value: &str) -> String {
    let normalized = normalize_path(value);
    if patterns().drive_root.is_match(&normalized) {
        return String::new();
    }
    normalized
}

/// Rebuild full paths from indented tree nodes. Directories are nodes
/// with a trailing slash or a deeper successor; only files are emitted.
fn build_tree_paths(nodes: &[TreeNode], issues: &mut Vec<RepoPathParseIssue>) -> Vec<String> {
    let mut stack: Vec<String> = Vec::new();
    let mut paths = Vec::new();
    for (idx, node) in nodes.iter().enumerate() {
        let is_dir = node.is_dir_hint || nodes.get(idx + 1).is_some_and(|next| next.depth > node.depth);
        if node.depth > stack.len() {
            issues.push(RepoPathParseIssue {
                line: node.line,
                message: "Unexpected tree indentation. Paste the full tree output.".into(),
                text: node.name.clone(),
            });
        }
        stack.truncate(node.depth);
        stack.resize(node.depth, String::new());
        stack.push(normalize_path(&node.name));
        if !is_dir {
            paths.push(stack.join("/"));
        }
    }
    paths
}

/// Parse free text into repository paths plus line-level issues.
pub fn parse_repo_input(text: &str) -> RepoPathParseResult {
    let p = patterns();
    let lines: Vec<&str> = text.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let has_tree_markers = lines.iter().any(|l| p.marker.is_match(l));
    let first_content = lines.iter().position(|l| !l.trim().is_empty());

    let mut issues = Vec::new();
    let mut raw_paths: Vec<(usize, String)> = Vec::new();
    let mut tree_nodes = Vec::new();
    let mut ls_entries: Vec<(usize, String)> = Vec::new();
    let mut ls_headers: HashSet<String> = HashSet::new();
    let mut current_ls_dir: Option<String> = None;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }
        if p.summary.is_match(trimmed) || p.windows_banner.is_match(trimmed) {
            continue;
        }
        if p.ls_error.is_match(trimmed) {
            issues.push(RepoPathParseIssue {
                line: line_no,
                message: "Command error from ls -R.".into(),
                text: trimmed.to_string(),
            });
            continue;
        }
        if let Some(caps) = p.ls_header.captures(trimmed) {
            let header = normalize_repo_root(caps.get(1).map_or("", |m| m.as_str()).trim());
            if !header.is_empty() {
                ls_headers.insert(header.clone());
            }
            current_ls_dir = Some(header);
            continue;
        }
        if let Some(node) = parse_tree_line(line, line_no) {
            tree_nodes.push(node);
            continue;
        }
        if let Some(dir) = &current_ls_dir {
            if trimmed == "." || trimmed == ".." {
                continue;
            }
            let entry = normalize_path(trimmed);
            if entry.is_empty() {
                continue;
            }
            let combined = if dir.is_empty() {
                entry
            } else {
                format!("{}/{}", dir, entry)
            };
            ls_entries.push((line_no, combined));
            continue;
        }
        if has_tree_markers {
            // The first non-empty line of `tree` output is the root label.
            if first_content == Some(idx) {
                continue;
            }
            issues.push(RepoPathParseIssue {
                line: line_no,
                message: "Unrecognized tree line. Paste the full output from `tree` or `ls -R`.".into(),
                text: trimmed.to_string(),
            });
            continue;
        }
        raw_paths.push((line_no, trimmed.to_string()));
    }

    if !tree_nodes.is_empty() {
        let built = build_tree_paths(&tree_nodes, &mut issues);
        raw_paths.extend(built.into_iter().map(|path| (0, path)));
    }
    raw_paths.extend(
        ls_entries
            .into_iter()
            .filter(|(_, entry)| !ls_headers.contains(entry)),
    );

    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    for (line, raw) in raw_paths {
        match sanitize_repo_path(&raw) {
            Some(path) => {
                if seen.insert(path.clone()) {
                    paths.push(path);
                }
            }
            None if normalize_path(&raw).is_empty() => {}
            None => issues.push(RepoPathParseIssue {
                line,
                message: "Path escapes the repository root and was ignored.".into(),
                text: raw,
            }),
        }
    }
    RepoPathParseResult { paths, issues }
}

/// Content-less tree from parsed paths; unsafe paths are dropped.
pub fn tree_from_paths<S: AsRef<str>>(paths: &[S]) -> RepoTree {
    RepoTree::from_paths(paths.iter().filter_map(|p| sanitize_repo_path(p.as_ref())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_list_with_comments_and_backslashes() {
        let input = "# my repo\n\nAGENTS.md\r\napps\\web\\AGENTS.md\n// note\n./CLAUDE.md\nAGENTS.md\n";
        let result = parse_repo_input(input);
        assert_eq!(result.paths, vec!["AGENTS.md", "apps/web/AGENTS.md", "CLAUDE.md"]);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_unicode_tree_output() {
        let input = "\
.
├── AGENTS.md
├── apps
│   └── web
│       └── AGENTS.md
└── docs/
    └── guide.md

3 directories, 3 files
";
        let result = parse_repo_input(input);
        assert_eq!(
            result.paths,
            vec!["AGENTS.md", "apps/web/AGENTS.md", "docs/guide.md"]
        );
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_ascii_tree_output() {
        let input = "repo\n+-- CLAUDE.md\n\\-- src\n    \\-- CLAUDE.md\n";
        let result = parse_repo_input(input);
        assert_eq!(result.paths, vec!["CLAUDE.md", "src/CLAUDE.md"]);
    }

    #[test]
    fn test_ls_recursive_output() {
        let input = ".:\nAGENTS.md\napps\n\napps:\nweb\n\napps/web:\nAGENTS.md\n";
        let result = parse_repo_input(input);
        assert_eq!(result.paths, vec!["AGENTS.md", "apps/web/AGENTS.md"]);
    }

    #[test]
    fn test_unrecognized_tree_lines_become_issues() {
        let input = ".\n├── AGENTS.md\nstray text\n";
        let result = parse_repo_input(input);
        assert_eq!(result.paths, vec!["AGENTS.md"]);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].line, 3);
        assert_eq!(result.issues[0].text, "stray text");
    }

    #[test]
    fn test_ls_errors_and_escaping_paths() {
        let result = parse_repo_input("ls: cannot open directory 'x'\n../secret/AGENTS.md\n");
        assert!(result.paths.is_empty());
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.issues[0].message, "Command error from ls -R.");
        assert_eq!(result.issues[1].line, 2);
    }

    #[test]
    fn test_tree_from_paths_drops_unsafe_entries() {
        let tree = tree_from_paths(&["AGENTS.md", "../x", "C:/Windows/AGENTS.md"]);
        assert_eq!(tree.paths(), vec!["AGENTS.md"]);
        assert!(tree.files.iter().all(|f| f.content.is_empty()));
    }
}
