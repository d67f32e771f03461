//! Stable diagnostic codes. Severity is a property of the code.

use super::Severity;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    CaseMismatchAgents,
    CaseMismatchOverride,
    CaseMismatchClaude,
    CaseMismatchGemini,
    CaseMismatchCopilotRoot,
    MissingAgents,
    MissingClaude,
    MissingGemini,
    MissingAgentsRoot,
    MissingClaudeRoot,
    MissingGeminiRoot,
    MissingCopilotCli,
    MissingGithubCopilot,
    MissingCursor,
    OverrideWithoutBase,
    MissingCwd,
    NoAncestorInstructions,
    ClaudeImportMissing,
    ClaudeImportOutsideRoot,
    ClaudeImportCircular,
    DeprecatedCursorrules,
    WrongFolderCopilotCli,
    WrongFolderGithubCopilot,
    WrongExtensionCopilotCli,
    WrongExtensionGithubCopilot,
    WrongExtensionCursor,
    MixedTools,
    NoInstructions,
    ScanRiskLargeTree,
    ScanRiskCursorRules,
}

use DiagnosticCode::*;

impl DiagnosticCode {
    pub const ALL: [DiagnosticCode; 30] = [
        CaseMismatchAgents,
        CaseMismatchOverride,
        CaseMismatchClaude,
        CaseMismatchGemini,
        CaseMismatchCopilotRoot,
        MissingAgents,
        MissingClaude,
        MissingGemini,
        MissingAgentsRoot,
        MissingClaudeRoot,
        MissingGeminiRoot,
        MissingCopilotCli,
        MissingGithubCopilot,
        MissingCursor,
        OverrideWithoutBase,
        MissingCwd,
        NoAncestorInstructions,
        ClaudeImportMissing,
        ClaudeImportOutsideRoot,
        ClaudeImportCircular,
        DeprecatedCursorrules,
        WrongFolderCopilotCli,
        WrongFolderGithubCopilot,
        WrongExtensionCopilotCli,
        WrongExtensionGithubCopilot,
        WrongExtensionCursor,
        MixedTools,
        NoInstructions,
        ScanRiskLargeTree,
        ScanRiskCursorRules,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseMismatchAgents => "case-mismatch.agents",
            CaseMismatchOverride => "case-mismatch.override",
            CaseMismatchClaude => "case-mismatch.claude",
            CaseMismatchGemini => "case-mismatch.gemini",
            CaseMismatchCopilotRoot => "case-mismatch.copilot-root",
            MissingAgents => "missing.agents",
            MissingClaude => "missing.claude",
            MissingGemini => "missing.gemini",
            MissingAgentsRoot => "missing.agents-root",
            MissingClaudeRoot => "missing.claude-root",
            MissingGeminiRoot => "missing.gemini-root",
            MissingCopilotCli => "missing.copilot-cli",
            MissingGithubCopilot => "missing.github-copilot",
            MissingCursor => "missing.cursor",
            OverrideWithoutBase => "override-without-base",
            MissingCwd => "missing-cwd",
            NoAncestorInstructions => "no-ancestor-instructions",
            ClaudeImportMissing => "claude-import.missing",
            ClaudeImportOutsideRoot => "claude-import.outside-root",
            ClaudeImportCircular => "claude-import.circular",
            DeprecatedCursorrules => "deprecated.cursorrules",
            WrongFolderCopilotCli => "wrong-folder.copilot-cli",
            WrongFolderGithubCopilot => "wrong-folder.github-copilot",
            WrongExtensionCopilotCli => "wrong-extension.copilot-cli",
            WrongExtensionGithubCopilot => "wrong-extension.github-copilot",
            WrongExtensionCursor => "wrong-extension.cursor",
            MixedTools => "mixed-tools",
            NoInstructions => "no-instructions",
            ScanRiskLargeTree => "scan-risk.large-tree",
            ScanRiskCursorRules => "scan-risk.cursor-rules",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            CaseMismatchAgents
            | CaseMismatchOverride
            | CaseMismatchClaude
            | CaseMismatchGemini
            | CaseMismatchCopilotRoot
            | MissingAgents
            | MissingClaude
            | MissingGemini
            | MissingCopilotCli
            | MissingGithubCopilot
            | MissingCursor
            | ClaudeImportOutsideRoot
            | ClaudeImportCircular => Severity::Error,
            _ => Severity::Warning,
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_and_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for code in DiagnosticCode::ALL {
            assert!(seen.insert(code.as_str()));
            assert_eq!(DiagnosticCode::parse(code.as_str()), Some(code));
        }
        assert_eq!(DiagnosticCode::parse("nope"), None);
    }

    #[test]
    fn test_fixed_severities() {
        assert_eq!(DiagnosticCode::MissingAgents.severity(), Severity::Error);
        assert_eq!(DiagnosticCode::MissingAgentsRoot.severity(), Severity::Warning);
        assert_eq!(DiagnosticCode::ClaudeImportMissing.severity(), Severity::Warning);
        assert_eq!(DiagnosticCode::ClaudeImportCircular.severity(), Severity::Error);
        assert_eq!(DiagnosticCode::MixedTools.severity(), Severity::Warning);
        assert_eq!(DiagnosticCode::NoInstructions.severity(), Severity::Warning);
        assert_eq!(DiagnosticCode::parse("scan-risk.large-tree"), Some(DiagnosticCode::ScanRiskLargeTree));
    }
}
