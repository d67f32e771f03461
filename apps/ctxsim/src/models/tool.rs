//! Closed set of supported coding-agent tools.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Tool identifier; drives every per-tool rule table.
pub enum SimulatorToolId {
    GithubCopilot,
    CopilotCli,
    ClaudeCode,
    GeminiCli,
    CodexCli,
    Cursor,
}

impl SimulatorToolId {
    pub const ALL: [SimulatorToolId; 6] = [
        SimulatorToolId::CodexCli,
        SimulatorToolId::ClaudeCode,
        SimulatorToolId::GeminiCli,
        SimulatorToolId::CopilotCli,
        SimulatorToolId::GithubCopilot,
        SimulatorToolId::Cursor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SimulatorToolId::GithubCopilot => "github-copilot",
            SimulatorToolId::CopilotCli => "copilot-cli",
            SimulatorToolId::ClaudeCode => "claude-code",
            SimulatorToolId::GeminiCli => "gemini-cli",
            SimulatorToolId::CodexCli => "codex-cli",
            SimulatorToolId::Cursor => "cursor",
        }
    }

    /// Human-readable product name.
    pub fn label(&self) -> &'static str {
        match self {
            SimulatorToolId::GithubCopilot => "GitHub Copilot",
            SimulatorToolId::CopilotCli => "Copilot CLI",
            SimulatorToolId::ClaudeCode => "Claude Code",
            SimulatorToolId::GeminiCli => "Gemini CLI",
            SimulatorToolId::CodexCli => "Codex CLI",
            SimulatorToolId::Cursor => "Cursor",
        }
    }
}

impl fmt::Display for SimulatorToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimulatorToolId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SimulatorToolId::ALL
            .iter()
            .copied()
            .find(|tool| tool.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = SimulatorToolId::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown tool '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}
