//! YAML front matter and `applyTo` scoping for instruction files.

use crate::utils::{is_within, join_dir_file, normalize_path};
use glob::{MatchOptions, Pattern};
use serde::Deserialize;

const SAMPLE_NAME: &str = "__ctxsim_sample__";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApplyToValue {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Default, Deserialize)]
struct RawFrontMatter {
    #[serde(rename = "applyTo", default)]
    apply_to: Option<ApplyToValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    /// `applyTo` globs, split on commas; empty when absent.
    pub apply_to: Vec<String>,
}

/// Body of a leading `---` block, if the file starts with one.
pub fn front_matter_block(content: &str) -> Option<&str> {
    let content = content.trim_start_matches('\u{feff}');
    let first_end = content.find('\n')?;
    if content[..first_end].trim_end() != "---" {
        return None;
    }
    let rest = &content[first_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

fn split_patterns(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(|p| p.trim().trim_matches(['"', '\'']).trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

/// Lenient `applyTo:` line scan for blocks that are not valid YAML.
fn scan_apply_to_line(block: &str) -> Vec<String> {
    block
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            (key.trim() == "applyTo").then(|| split_patterns(value).collect())
        })
        .unwrap_or_default()
}

pub fn parse_front_matter(content: &str) -> Option<FrontMatter> {
    let block = front_matter_block(content)?;
    let apply_to = match serde_yaml::from_str::<RawFrontMatter>(block) {
        Ok(raw) => match raw.apply_to {
            Some(ApplyToValue::One(value)) => split_patterns(&value).collect(),
            Some(ApplyToValue::Many(values)) => values.iter().flat_map(|v| split_patterns(v)).collect(),
            None => Vec::new(),
        },
        Err(err) => {
            log::debug!("front matter is not valid yaml ({}); scanning lines", err);
            scan_apply_to_line(block)
        }
    };
    Some(FrontMatter { apply_to })
}

/// Expand `{a,b}` alternatives, which `glob::Pattern` does not support.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(close_rel) = pattern[open..].find('}') else {
        return vec![pattern.to_string()];
    };
    let close = open + close_rel;
    let (head, tail) = (&pattern[..open], &pattern[close + 1..]);
    pattern[open + 1..close]
        .split(',')
        .flat_map(|alt| expand_braces(&format!("{}{}{}", head, alt, tail)))
        .collect()
}

/// Compiled `applyTo` globs.
pub struct ApplyTo {
    match_all: bool,
    patterns: Vec<Pattern>,
}

impl ApplyTo {
    pub fn new(globs: &[String]) -> Self {
        let mut match_all = false;
        let mut patterns = Vec::new();
        for raw in globs {
            let cleaned = raw.trim_start_matches("./").trim_start_matches('/');
            if cleaned == "*" || cleaned == "**" || cleaned == "**/*" {
                match_all = true;
                continue;
            }
            for expanded in expand_braces(cleaned) {
                match Pattern::new(&expanded) {
                    Ok(p) => patterns.push(p),
                    Err(err) => log::debug!("ignoring invalid applyTo glob '{}': {}", expanded, err),
                }
            }
        }
        Self { match_all, patterns }
    }

    pub fn matches(&self, path: &str) -> bool {
        let opts = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.match_all || self.patterns.iter().any(|p| p.matches_with(path, opts))
    }

    /// True when the globs select anything under `cwd`: a tree file inside
    /// it, or a hypothetical file directly in it.
    pub fn applies_under<'p, I>(&self, cwd: &str, tree_paths: I) -> bool
    where
        I: IntoIterator<Item = &'p str>,
    {
        if self.match_all {
            return true;
        }
        let cwd = normalize_path(cwd);
        if tree_paths
            .into_iter()
            .any(|p| is_within(p, &cwd) && self.matches(p))
        {
            return true;
        }
        !cwd.is_empty() && (self.matches(&cwd) || self.matches(&join_dir_file(&cwd, SAMPLE_NAME)))
    }
}
