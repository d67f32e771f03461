//! Configuration discovery and effective settings resolution.
//!
//! ctxsim reads `ctxsim.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `tool`: unset (detected from the tree)
//! - `cwd`: unset (repo root for resolution; `missing-cwd` for diagnostics)
//! - `output`: `human`
//! - `[scan]`: the ingestion defaults in `ingest`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::{Error, Result};
use crate::ingest::ScanOptions;
use crate::models::SimulatorToolId;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILES: [&str; 3] = ["ctxsim.toml", "ctxsim.yaml", "ctxsim.yml"];

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Ingestion limits under `[scan]`; unset keys keep their defaults.
pub struct ScanCfg {
    pub ignore_dirs: Option<Vec<String>>,
    pub max_files: Option<usize>,
    pub max_compressed_bytes: Option<u64>,
    pub max_uncompressed_bytes: Option<u64>,
    pub max_compression_ratio: Option<f64>,
    pub include_only: Option<Vec<String>>,
    pub include_content: Option<bool>,
    pub content_allowlist: Option<Vec<String>>,
    pub max_content_bytes: Option<usize>,
    pub max_read_bytes: Option<u64>,
}

impl ScanCfg {
    fn apply(self, mut opts: ScanOptions) -> ScanOptions {
        if let Some(v) = self.ignore_dirs {
            opts.ignore_dirs = v;
        }
        opts.max_files = self.max_files.or(opts.max_files);
        if let Some(v) = self.max_compressed_bytes {
            opts.max_compressed_bytes = v;
        }
        if let Some(v) = self.max_uncompressed_bytes {
            opts.max_uncompressed_bytes = v;
        }
        if let Some(v) = self.max_compression_ratio {
            opts.max_compression_ratio = v;
        }
        if let Some(v) = self.include_only {
            opts.include_only = v;
        }
        if let Some(v) = self.include_content {
            opts.include_content = v;
        }
        if self.content_allowlist.is_some() {
            opts.content_allowlist = self.content_allowlist;
        }
        if let Some(v) = self.max_content_bytes {
            opts.max_content_bytes = v;
        }
        if let Some(v) = self.max_read_bytes {
            opts.max_read_bytes = v;
        }
        opts
    }
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
/// Root configuration loaded from `ctxsim.toml|yaml`.
pub struct CtxsimConfig {
    pub tool: Option<String>,
    pub cwd: Option<String>,
    pub output: Option<String>,
    #[serde(default)]
    pub scan: Option<ScanCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub tool: Option<SimulatorToolId>,
    pub cwd: Option<String>,
    pub output: String,
    pub scan: ScanOptions,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `ctxsim.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|name| cur.join(name).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `CtxsimConfig` from `ctxsim.toml` or `ctxsim.yaml|yml` if present.
pub fn load_config(root: &Path) -> Result<Option<CtxsimConfig>> {
    let toml_path = root.join("ctxsim.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path)?;
        let cfg: CtxsimConfig = toml::from_str(&s)
            .map_err(|e| Error::Config(format!("{}: {}", toml_path.display(), e)))?;
        return Ok(Some(cfg));
    }
    for yml in ["ctxsim.yaml", "ctxsim.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p)?;
            let cfg: CtxsimConfig =
                serde_yaml::from_str(&s).map_err(|e| Error::Config(format!("{}: {}", p.display(), e)))?;
            return Ok(Some(cfg));
        }
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_tool: Option<SimulatorToolId>,
    cli_cwd: Option<&str>,
    cli_output: Option<&str>,
) -> Result<Effective> {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root)?.unwrap_or_default();
    log::debug!("repo root {}", repo_root.display());

    let tool = match (cli_tool, cfg.tool.as_deref()) {
        (Some(tool), _) => Some(tool),
        (None, Some(raw)) => Some(raw.parse::<SimulatorToolId>().map_err(Error::Config)?),
        (None, None) => None,
    };

    let cwd = cli_cwd.map(|s| s.to_string()).or(cfg.cwd);

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    if output != "human" && output != "json" {
        return Err(Error::Config(format!(
            "unknown output mode '{}' (expected human or json)",
            output
        )));
    }

    let scan = cfg
        .scan
        .map(|s| s.apply(ScanOptions::default()))
        .unwrap_or_default();

    Ok(Effective {
        repo_root,
        tool,
        cwd,
        output,
        scan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("ctxsim.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
tool = "claude-code"
cwd = "packages/ui"
output = "json"
[scan]
maxFiles = 200
ignoreDirs = ["vendor"]
    "#
        )
        .unwrap();

        // Resolve using explicit repo_root to avoid global CWD races
        let eff = resolve_effective(root.to_str(), None, None, None).unwrap();
        assert_eq!(eff.tool, Some(SimulatorToolId::ClaudeCode));
        assert_eq!(eff.cwd.as_deref(), Some("packages/ui"));
        assert_eq!(eff.output, "json");
        assert_eq!(eff.scan.max_files, Some(200));
        assert_eq!(eff.scan.ignore_dirs, vec!["vendor"]);
        assert_eq!(eff.scan.max_compression_ratio, ScanOptions::default().max_compression_ratio);
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("ctxsim.yaml"), "tool: gemini-cli\nscan:\n  includeContent: true\n").unwrap();

        let eff = resolve_effective(root.to_str(), None, None, None).unwrap();
        assert_eq!(eff.tool, Some(SimulatorToolId::GeminiCli));
        assert_eq!(eff.cwd, None);
        assert_eq!(eff.output, "human");
        assert!(eff.scan.include_content);
    }

    #[test]
    fn test_cli_overrides_config() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("ctxsim.toml"), "tool = \"cursor\"\ncwd = \"a\"\noutput = \"json\"\n").unwrap();

        let eff = resolve_effective(
            root.to_str(),
            Some(SimulatorToolId::CodexCli),
            Some("b"),
            Some("human"),
        )
        .unwrap();
        assert_eq!(eff.tool, Some(SimulatorToolId::CodexCli));
        assert_eq!(eff.cwd.as_deref(), Some("b"));
        assert_eq!(eff.output, "human");
    }

    #[test]
    fn test_nested_start_finds_git_root() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("apps/web")).unwrap();
        assert_eq!(detect_repo_root(&root.join("apps/web")), root.to_path_buf());
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("ctxsim.toml"), "tool = \"windsurf\"\n").unwrap();
        let err = resolve_effective(root.to_str(), None, None, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        fs::write(root.join("ctxsim.toml"), "output = \"xml\"\n").unwrap();
        assert!(resolve_effective(root.to_str(), None, None, None).is_err());

        fs::write(root.join("ctxsim.toml"), "tool = [").unwrap();
        assert!(matches!(
            resolve_effective(root.to_str(), None, None, None),
            Err(Error::Config(_))
        ));
    }
}
