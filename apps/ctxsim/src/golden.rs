//! Golden fixture suites for the context resolver.
//!
//! A suite is a JSON file of hand-authored cases. `loaded` order must match
//! exactly; `shadowed` paths and warning codes compare as sets and are only
//! checked when the case lists them.

use crate::error::Result;
use crate::models::{RepoTree, RepoTreeFile, SimulatorToolId};
use crate::simulate::{simulate_context_resolution, warning_codes, SimulationInput, SimulationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenSuite {
    pub id: String,
    pub cases: Vec<GoldenCase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenCase {
    pub id: String,
    pub tool: SimulatorToolId,
    #[serde(default)]
    pub cwd: String,
    pub files: Vec<GoldenFile>,
    pub expected: GoldenExpected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenFile {
    pub path: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenExpected {
    pub loaded: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadowed: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseOutcome {
    pub id: String,
    /// Human-readable differences; empty when the case passes.
    pub mismatches: Vec<String>,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

pub fn parse_golden_suite(text: &str) -> Result<GoldenSuite> {
    Ok(serde_json::from_str(text)?)
}

pub fn load_golden_suite(path: &Path) -> Result<GoldenSuite> {
    let text = fs::read_to_string(path)?;
    parse_golden_suite(&text)
}

impl GoldenCase {
    pub fn input(&self) -> SimulationInput {
        SimulationInput {
            tool: self.tool,
            cwd: self.cwd.clone(),
            tree: RepoTree::from_files(
                self.files
                    .iter()
                    .map(|f| RepoTreeFile::new(f.path.clone(), f.content.clone()))
                    .collect(),
            ),
        }
    }
}

fn set_diff(label: &str, expected: &[String], actual: BTreeSet<String>, out: &mut Vec<String>) {
    let expected: BTreeSet<String> = expected.iter().cloned().collect();
    if expected != actual {
        out.push(format!(
            "{}: expected {:?}, got {:?}",
            label,
            expected.into_iter().collect::<Vec<_>>(),
            actual.into_iter().collect::<Vec<_>>()
        ));
    }
}

/// Compare a resolver result with a case's expectations.
pub fn compare_case(case: &GoldenCase, result: &SimulationResult) -> CaseOutcome {
    let mut mismatches = Vec::new();
    let loaded: Vec<String> = result.loaded.iter().map(|f| f.path.clone()).collect();
    if loaded != case.expected.loaded {
        mismatches.push(format!("loaded: expected {:?}, got {:?}", case.expected.loaded, loaded));
    }
    if let Some(shadowed) = &case.expected.shadowed {
        let actual = result.shadowed.iter().map(|f| f.path.clone()).collect();
        set_diff("shadowed", shadowed, actual, &mut mismatches);
    }
    if let Some(warnings) = &case.expected.warnings {
        set_diff("warnings", warnings, warning_codes(result), &mut mismatches);
    }
    CaseOutcome {
        id: case.id.clone(),
        mismatches,
    }
}

pub fn evaluate_case(case: &GoldenCase) -> CaseOutcome {
    let result = simulate_context_resolution(&case.input());
    compare_case(case, &result)
}

pub fn evaluate_suite(suite: &GoldenSuite) -> Vec<CaseOutcome> {
    suite.cases.iter().map(evaluate_case).collect()
}
