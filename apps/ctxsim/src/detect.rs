//! Tool detection from observed repository paths.
//!
//! Scores every path against each tool's weighted signature table and
//! refuses to guess when the outcome is ambiguous: a top-score tie, or two
//! tools with overlapping signatures both matching, yields `tool: None`.

use crate::models::SimulatorToolId;
use crate::rules::{PROFILES, ToolProfile};
use crate::utils::normalize_path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionConfidence {
    High,
    Low,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionCandidate {
    pub tool: SimulatorToolId,
    pub score: u32,
    /// Sorted, unique matching paths.
    pub paths: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    /// `None` when nothing matched or the setup is ambiguous.
    pub tool: Option<SimulatorToolId>,
    pub confidence: DetectionConfidence,
    pub is_mixed: bool,
    pub candidates: Vec<DetectionCandidate>,
    pub matched_tools: Vec<SimulatorToolId>,
}

fn score_profile(profile: &ToolProfile, paths: &BTreeSet<String>) -> Option<DetectionCandidate> {
    let mut score = 0u32;
    let mut matched: BTreeSet<String> = BTreeSet::new();
    let mut reasons: Vec<String> = Vec::new();
    for rule in profile.detect {
        let hits: Vec<&String> = paths.iter().filter(|p| rule.rule.matches(p)).collect();
        if hits.is_empty() {
            continue;
        }
        score += rule.weight * hits.len() as u32;
        reasons.push(rule.rule.describe());
        matched.extend(hits.into_iter().cloned());
    }
    if score == 0 {
        return None;
    }
    Some(DetectionCandidate {
        tool: profile.tool,
        score,
        paths: matched.into_iter().collect(),
        reason: format!("Matched {}", reasons.join(", ")),
    })
}

/// Guess which tool a repository is configured for.
pub fn detect_tool<S: AsRef<str>>(paths: &[S]) -> DetectionResult {
    let normalized: BTreeSet<String> = paths
        .iter()
        .map(|p| normalize_path(p.as_ref()))
        .filter(|p| !p.is_empty())
        .collect();

    let mut candidates: Vec<DetectionCandidate> = PROFILES
        .iter()
        .filter_map(|profile| score_profile(profile, &normalized))
        .collect();
    // Stable sort keeps table order among equal scores.
    candidates.sort_by(|a, b| b.score.cmp(&a.score));

    let matched_tools: Vec<SimulatorToolId> = candidates.iter().map(|c| c.tool).collect();
    let Some(top) = candidates.first() else {
        return DetectionResult {
            tool: None,
            confidence: DetectionConfidence::None,
            is_mixed: false,
            candidates,
            matched_tools,
        };
    };

    let top_score = top.score;
    let tied = candidates.iter().filter(|c| c.score == top_score).count() > 1;
    let overlapping = matched_tools.iter().any(|tool| {
        crate::rules::profile(*tool)
            .overlaps
            .iter()
            .any(|other| matched_tools.contains(other))
    });

    if tied || overlapping {
        log::debug!(
            "ambiguous tool detection: tied={} overlapping={} tools={:?}",
            tied,
            overlapping,
            matched_tools
        );
        return DetectionResult {
            tool: None,
            confidence: DetectionConfidence::Low,
            is_mixed: true,
            candidates,
            matched_tools,
        };
    }

    let is_mixed = candidates.len() > 1;
    DetectionResult {
        tool: Some(top.tool),
        confidence: if is_mixed {
            DetectionConfidence::Low
        } else {
            DetectionConfidence::High
        },
        is_mixed,
        candidates,
        matched_tools,
    }
}
