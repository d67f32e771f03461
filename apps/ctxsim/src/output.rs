//! Output rendering for every command.
//!
//! Supports `human` (default) and `json` outputs. The JSON form is built by
//! the pure `compose_*_json` functions so its shape can be tested.

use crate::detect::DetectionResult;
use crate::diagnostics::InstructionDiagnostics;
use crate::golden::CaseOutcome;
use crate::models::{ContentLintResult, RepoScanResult, Severity, SimulatorToolId, Summary};
use crate::simulate::SimulationResult;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn print_json(value: &JsonVal) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(_) => println!("{}", value),
    }
}

fn paint(text: &str, color: bool, style: fn(&str) -> String) -> String {
    if color {
        style(text)
    } else {
        text.to_string()
    }
}

fn severity_tag(sev: Severity, color: bool) -> (String, String) {
    match sev {
        Severity::Error => (
            paint("✖", color, |s| s.red().to_string()),
            paint("⟦error⟧", color, |s| s.red().bold().to_string()),
        ),
        Severity::Warning => (
            paint("▲", color, |s| s.yellow().to_string()),
            paint("⟦warn⟧", color, |s| s.yellow().bold().to_string()),
        ),
    }
}

fn print_summary(summary: &Summary, extra: &str, color: bool) {
    let line = format!(
        "— Summary — errors={} warnings={}{}",
        summary.errors, summary.warnings, extra
    );
    println!("{}", paint(&line, color, |s| s.bold().to_string()));
}

fn print_finding(
    sev: Severity,
    code: &str,
    path: Option<&str>,
    message: &str,
    suggestion: Option<&str>,
    color: bool,
) {
    let (icon, tag) = severity_tag(sev, color);
    let file = paint(path.unwrap_or("."), color, |s| s.bold().to_string());
    println!("{} {} {} ❲{}❳ — {}", icon, tag, file, code, message);
    if let Some(hint) = suggestion {
        println!("    {} {}", paint("hint:", color, |s| s.cyan().to_string()), hint);
    }
}

pub fn compose_detect_json(res: &DetectionResult) -> JsonVal {
    json!(res)
}

pub fn print_detect(res: &DetectionResult, output: &str) {
    if output == "json" {
        return print_json(&compose_detect_json(res));
    }
    let color = use_colors(output);
    match res.tool {
        Some(tool) => println!(
            "{} {} ({:?} confidence)",
            paint("tool:", color, |s| s.green().bold().to_string()),
            tool.label(),
            res.confidence
        ),
        None => println!(
            "{} none{}",
            paint("tool:", color, |s| s.yellow().bold().to_string()),
            if res.is_mixed { " (mixed setup; pass --tool)" } else { "" }
        ),
    }
    for c in &res.candidates {
        println!("  {:<16} score={:<3} {}", c.tool.as_str(), c.score, c.reason);
    }
}

pub fn compose_simulation_json(tool: SimulatorToolId, cwd: &str, res: &SimulationResult) -> JsonVal {
    json!({
        "tool": tool,
        "cwd": cwd,
        "loaded": res.loaded,
        "shadowed": res.shadowed,
        "warnings": res.warnings,
    })
}

pub fn print_simulation(tool: SimulatorToolId, cwd: &str, res: &SimulationResult, output: &str) {
    if output == "json" {
        return print_json(&compose_simulation_json(tool, cwd, res));
    }
    let color = use_colors(output);
    let where_ = if cwd.is_empty() { "repo root" } else { cwd };
    println!(
        "{} {} at {}",
        paint("simulate:", color, |s| s.bold().to_string()),
        tool.label(),
        where_
    );
    for (i, f) in res.loaded.iter().enumerate() {
        let scope = f.scope.as_deref().map(|s| format!(" [{}]", s)).unwrap_or_default();
        println!(
            "  {}. {}{} — {}",
            i + 1,
            paint(&f.path, color, |s| s.green().to_string()),
            scope,
            f.reason
        );
    }
    for f in &res.shadowed {
        println!(
            "  {} {} — {}",
            paint("shadowed", color, |s| s.bright_black().to_string()),
            f.path,
            f.reason
        );
    }
    for w in &res.warnings {
        print_finding(
            w.severity,
            &w.code,
            w.path.as_deref(),
            &w.message,
            w.suggestion.as_deref(),
            color,
        );
    }
}

pub fn compose_diagnostics_json(res: &InstructionDiagnostics) -> JsonVal {
    let summary = Summary::from_severities(res.diagnostics.iter().map(|d| d.severity));
    json!({
        "tool": res.tool,
        "diagnostics": res.diagnostics,
        "summary": summary,
    })
}

pub fn print_diagnostics(res: &InstructionDiagnostics, output: &str) {
    if output == "json" {
        return print_json(&compose_diagnostics_json(res));
    }
    let color = use_colors(output);
    for d in &res.diagnostics {
        print_finding(
            d.severity,
            &d.code,
            d.path.as_deref(),
            &d.message,
            d.suggestion.as_deref(),
            color,
        );
    }
    let summary = Summary::from_severities(res.diagnostics.iter().map(|d| d.severity));
    print_summary(&summary, &format!(" tool={}", res.tool), color);
}

pub fn compose_content_lint_json(res: &ContentLintResult) -> JsonVal {
    let summary = Summary::from_severities(res.issues.iter().map(|i| i.severity));
    json!({
        "issues": res.issues,
        "checkedFiles": res.checked_files,
        "skippedFiles": res.skipped_files,
        "summary": summary,
    })
}

pub fn print_content_lint(res: &ContentLintResult, output: &str) {
    if output == "json" {
        return print_json(&compose_content_lint_json(res));
    }
    let color = use_colors(output);
    for is in &res.issues {
        print_finding(
            is.severity,
            &is.code,
            Some(&is.path),
            &is.message,
            is.suggestion.as_deref(),
            color,
        );
    }
    let summary = Summary::from_severities(res.issues.iter().map(|i| i.severity));
    print_summary(
        &summary,
        &format!(" checked={} skipped={}", res.checked_files, res.skipped_files),
        color,
    );
}

pub fn compose_scan_json(res: &RepoScanResult) -> JsonVal {
    json!(res)
}

pub fn print_scan(res: &RepoScanResult, output: &str) {
    if output == "json" {
        return print_json(&compose_scan_json(res));
    }
    let color = use_colors(output);
    for f in &res.tree.files {
        let status = f
            .content_status
            .map(|s| format!(" ({:?})", s).to_lowercase())
            .unwrap_or_default();
        println!("{}{}", f.shown_path(), status);
    }
    let line = format!(
        "— Scan — total={} matched={}{}",
        res.total_files,
        res.matched_files,
        if res.truncated { " truncated" } else { "" }
    );
    println!("{}", paint(&line, color, |s| s.bold().to_string()));
}

pub fn compose_fixtures_json(suite_id: &str, outcomes: &[CaseOutcome]) -> JsonVal {
    let failed = outcomes.iter().filter(|o| !o.passed()).count();
    json!({
        "suite": suite_id,
        "cases": outcomes,
        "summary": { "total": outcomes.len(), "failed": failed },
    })
}

pub fn print_fixtures(suite_id: &str, outcomes: &[CaseOutcome], output: &str) {
    if output == "json" {
        return print_json(&compose_fixtures_json(suite_id, outcomes));
    }
    let color = use_colors(output);
    for o in outcomes {
        if o.passed() {
            println!("{} {}", paint("ok", color, |s| s.green().bold().to_string()), o.id);
        } else {
            println!("{} {}", paint("FAIL", color, |s| s.red().bold().to_string()), o.id);
            for m in &o.mismatches {
                println!("    {}", m);
            }
        }
    }
    let failed = outcomes.iter().filter(|o| !o.passed()).count();
    let line = format!("— Fixtures — {} total={} failed={}", suite_id, outcomes.len(), failed);
    println!("{}", paint(&line, color, |s| s.bold().to_string()));
}
