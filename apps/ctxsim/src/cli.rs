//! CLI argument parsing via `clap`.

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ctxsim",
    version,
    about = "ctxsim: which agent instruction files load, and why",
    long_about = "ctxsim resolves which instruction files a coding agent (Codex CLI, Claude Code, Gemini CLI, GitHub Copilot, Copilot CLI, Cursor) loads for a working directory, and reports naming, placement, and content problems.\n\nConfiguration precedence: CLI > ctxsim.toml > defaults.",
    after_help = "Examples:\n  ctxsim detect\n  ctxsim simulate --tool codex-cli --cwd apps/web\n  ctxsim diagnose --zip repo.zip --tool claude-code --output json\n  tree -a | ctxsim simulate --tree - --tool gemini-cli --cwd src",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Args, Clone, Debug, Default)]
/// Where the repository tree comes from. Defaults to scanning `--repo-root`.
pub struct InputArgs {
    #[arg(long, help = "Repository root (default: current dir)")]
    pub repo_root: Option<String>,
    #[arg(long, conflicts_with = "tree", help = "Scan a ZIP archive instead of a directory")]
    pub zip: Option<String>,
    #[arg(long, help = "Read a path listing (plain, tree, or ls -R output) from a file, or - for stdin")]
    pub tree: Option<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current ctxsim version.")]
    Version,
    /// Guess the configured tool
    #[command(
        about = "Detect the configured tool",
        long_about = "Score instruction paths against every tool's signature. Ambiguous or mixed setups report no tool.",
        after_help = "Examples:\n  ctxsim detect\n  ctxsim detect --zip repo.zip --output json"
    )]
    Detect {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Resolve loaded and shadowed files
    #[command(
        about = "Simulate context resolution",
        long_about = "List the files a tool loads for a working directory, in load order, plus files that exist but do not apply.",
        after_help = "Examples:\n  ctxsim simulate --tool codex-cli --cwd apps/web\n  ctxsim simulate --tree paths.txt --tool github-copilot --cwd src"
    )]
    Simulate {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, help = "Tool id (default: detected)")]
        tool: Option<String>,
        #[arg(long, help = "Working directory relative to the repo root (default: root)")]
        cwd: Option<String>,
    },
    /// Static naming and placement diagnostics
    #[command(
        about = "Run diagnostics",
        long_about = "Check instruction file names, placement, imports, and mixed-tool setups. Error-severity findings exit non-zero.",
        after_help = "Examples:\n  ctxsim diagnose --tool claude-code --cwd packages/ui\n  ctxsim diagnose --zip repo.zip --output json"
    )]
    Diagnose {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, help = "Tool id (default: detected)")]
        tool: Option<String>,
        #[arg(long, help = "Working directory relative to the repo root")]
        cwd: Option<String>,
    },
    /// Lint instruction file content
    #[command(
        about = "Lint instruction content",
        long_about = "Check allowlisted instruction files for missing front matter, missing commands, and skipped or truncated content."
    )]
    Lint {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Ingest only
    #[command(
        about = "Scan a repository",
        long_about = "Ingest a directory, ZIP, or path listing and print the resulting tree with counts."
    )]
    Scan {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Run a golden fixture suite
    #[command(
        about = "Run golden fixtures",
        long_about = "Evaluate a golden-suite.json file against the resolver. Any failing case exits non-zero."
    )]
    Fixtures {
        #[arg(help = "Path to golden-suite.json")]
        suite: String,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_args_parse() {
        let cli = Cli::try_parse_from([
            "ctxsim", "simulate", "--tool", "codex-cli", "--cwd", "apps/web", "--output", "json",
        ])
        .unwrap();
        match cli.cmd {
            Commands::Simulate { input, tool, cwd } => {
                assert_eq!(tool.as_deref(), Some("codex-cli"));
                assert_eq!(cwd.as_deref(), Some("apps/web"));
                assert_eq!(input.output.as_deref(), Some("json"));
                assert!(input.zip.is_none());
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_zip_and_tree_conflict() {
        assert!(Cli::try_parse_from(["ctxsim", "scan", "--zip", "a.zip", "--tree", "-"]).is_err());
    }
}
