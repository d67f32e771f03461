//! ctxsim CLI binary entry point.
//! Loads the repository tree, runs the requested pass, and prints results.

use clap::Parser;
use ctxsim::cli::{Cli, Commands, InputArgs};
use ctxsim::config::{self, Effective};
use ctxsim::content_lint::lint_instruction_content;
use ctxsim::detect::detect_tool;
use ctxsim::diagnostics::{compute_instruction_diagnostics, DiagnosticsInput};
use ctxsim::error::Error;
use ctxsim::golden::{evaluate_suite, load_golden_suite};
use ctxsim::models::{RepoScanResult, SimulatorToolId};
use ctxsim::simulate::{simulate_context_resolution, SimulationInput};
use ctxsim::{ingest, output, utils};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::process;

/// Input or configuration problem: report and exit 2.
fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", utils::error_prefix(), message);
    process::exit(2);
}

fn effective(input: &InputArgs, tool: Option<&str>, cwd: Option<&str>) -> Effective {
    let tool = tool.map(|raw| raw.parse::<SimulatorToolId>().unwrap_or_else(|e| fail(e)));
    config::resolve_effective(input.repo_root.as_deref(), tool, cwd, input.output.as_deref())
        .unwrap_or_else(|e| fail(e))
}

fn read_tree_text(source: &str) -> std::io::Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        fs::read_to_string(source)
    }
}

fn load_tree(input: &InputArgs, eff: &Effective, with_content: bool) -> RepoScanResult {
    let mut scan = eff.scan.clone();
    scan.include_content |= with_content;

    if let Some(zip) = &input.zip {
        return ingest::scan_zip_file(Path::new(zip), &scan).unwrap_or_else(|e| match e {
            Error::Zip(err) => fail(format!("{} ({})", err, err.kind.as_str())),
            other => fail(format!("{}: {}", zip, other)),
        });
    }
    if let Some(source) = &input.tree {
        let text = read_tree_text(source).unwrap_or_else(|e| fail(format!("cannot read {}: {}", source, e)));
        let parsed = ingest::parse_repo_input(&text);
        for issue in &parsed.issues {
            eprintln!(
                "{} line {}: {} ({})",
                utils::note_prefix(),
                issue.line,
                issue.message,
                issue.text
            );
        }
        let tree = ingest::tree_from_paths(&parsed.paths);
        let count = tree.files.len();
        return RepoScanResult {
            tree,
            total_files: count,
            matched_files: count,
            truncated: false,
        };
    }
    let result = ingest::scan_directory(&eff.repo_root, &scan).unwrap_or_else(|e| fail(e));
    if result.truncated && eff.output != "json" {
        eprintln!(
            "{} Scan stopped after {} files; results may be incomplete.",
            utils::note_prefix(),
            result.tree.files.len()
        );
    }
    result
}

fn resolve_tool(eff: &Effective, scan: &RepoScanResult) -> SimulatorToolId {
    if let Some(tool) = eff.tool {
        return tool;
    }
    let detection = detect_tool(&scan.tree.paths());
    match detection.tool {
        Some(tool) => {
            if eff.output != "json" {
                eprintln!("{} Detected {}; pass --tool to override.", utils::info_prefix(), tool.label());
            }
            tool
        }
        None if detection.is_mixed => fail("Instruction files for several tools were found. Pass --tool."),
        None => fail("Could not detect a tool from the tree. Pass --tool."),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Detect { input } => {
            let eff = effective(&input, None, None);
            let scan = load_tree(&input, &eff, false);
            output::print_detect(&detect_tool(&scan.tree.paths()), &eff.output);
        }
        Commands::Simulate { input, tool, cwd } => {
            let eff = effective(&input, tool.as_deref(), cwd.as_deref());
            let scan = load_tree(&input, &eff, true);
            let tool = resolve_tool(&eff, &scan);
            let cwd = eff.cwd.clone().unwrap_or_default();
            let result = simulate_context_resolution(&SimulationInput {
                tool,
                cwd: cwd.clone(),
                tree: scan.tree,
            });
            output::print_simulation(tool, &cwd, &result, &eff.output);
        }
        Commands::Diagnose { input, tool, cwd } => {
            let eff = effective(&input, tool.as_deref(), cwd.as_deref());
            let scan = load_tree(&input, &eff, true);
            let tool = resolve_tool(&eff, &scan);
            let result = compute_instruction_diagnostics(&DiagnosticsInput {
                tool,
                tree: scan.tree,
                cwd: eff.cwd.clone(),
            });
            output::print_diagnostics(&result, &eff.output);
            if result.has_errors() {
                process::exit(1);
            }
        }
        Commands::Lint { input } => {
            let eff = effective(&input, None, None);
            let scan = load_tree(&input, &eff, true);
            let result = lint_instruction_content(&scan.tree);
            output::print_content_lint(&result, &eff.output);
        }
        Commands::Scan { input } => {
            let eff = effective(&input, None, None);
            let scan = load_tree(&input, &eff, false);
            output::print_scan(&scan, &eff.output);
        }
        Commands::Fixtures {
            suite,
            output: out,
        } => {
            let eff = config::resolve_effective(None, None, None, out.as_deref()).unwrap_or_else(|e| fail(e));
            let loaded = load_golden_suite(Path::new(&suite)).unwrap_or_else(|e| fail(e));
            let outcomes = evaluate_suite(&loaded);
            output::print_fixtures(&loaded.id, &outcomes, &eff.output);
            if outcomes.iter().any(|o| !o.passed()) {
                process::exit(1);
            }
        }
    }
}
