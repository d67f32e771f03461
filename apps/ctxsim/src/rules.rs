//! Declarative per-tool rule tables.
//!
//! Each supported tool owns one `ToolProfile`: detection signatures with
//! weights, the resolution strategy the resolver interprets, and the naming
//! and placement rules the diagnostics pass checks. Adding a tool means
//! adding a profile here; the passes themselves stay generic.

use crate::models::{DiagnosticCode, SimulatorToolId};
use crate::utils::{base_name, is_named_file};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Path-matching primitive used by every table.
pub enum PathRule {
    /// Exact repository path.
    Exact(&'static str),
    /// File name in any directory, including the root.
    Named(&'static str),
    /// Any path strictly under `prefix` whose name ends with `suffix`.
    Under {
        prefix: &'static str,
        suffix: &'static str,
    },
}

impl PathRule {
    pub fn matches(&self, path: &str) -> bool {
        match *self {
            PathRule::Exact(p) => path == p,
            PathRule::Named(name) => is_named_file(path, name),
            PathRule::Under { prefix, suffix } => {
                path.len() > prefix.len()
                    && path.starts_with(prefix)
                    && base_name(path).ends_with(suffix)
                    && base_name(path).len() > suffix.len()
            }
        }
    }

    /// Short pattern text for reasons and messages.
    pub fn describe(&self) -> String {
        match *self {
            PathRule::Exact(p) | PathRule::Named(p) => p.to_string(),
            PathRule::Under { prefix, suffix } => format!("{}*{}", prefix, suffix),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DetectRule {
    pub rule: PathRule,
    pub weight: u32,
}

#[derive(Debug, Clone, Copy)]
/// One group of independently loaded files.
pub struct Tier {
    pub rule: PathRule,
    /// Loaded only when `applyTo` front matter matches under cwd.
    pub scoped: bool,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub enum Resolution {
    /// One file per ancestor directory, stacked root to leaf.
    Stacking {
        file_name: &'static str,
        /// Same-directory file that replaces `file_name` when present.
        override_name: Option<&'static str>,
        /// Follow `@path` imports after each loaded file.
        imports: bool,
    },
    /// Independent files, tier order then path order.
    Tiered(&'static [Tier]),
}

#[derive(Debug, Clone, Copy)]
/// A fixed-severity finding template; severity lives on the code.
pub struct Finding {
    pub code: DiagnosticCode,
    pub message: &'static str,
    pub suggestion: &'static str,
    pub expected_path: Option<&'static str>,
}

#[derive(Debug, Clone, Copy)]
/// Files that belong in the tool's folder but sit in a sibling tool's.
pub struct WrongFolderRule {
    pub found: PathRule,
    pub own: PathRule,
    pub finding: Finding,
}

#[derive(Debug, Clone, Copy)]
/// Files inside the tool's folder that miss the required suffix.
pub struct WrongExtensionRule {
    pub dir_prefix: &'static str,
    pub suffix: &'static str,
    /// Message subject, e.g. "Scoped Copilot CLI instructions".
    pub subject: &'static str,
    pub code: DiagnosticCode,
    pub suggestion: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct DeprecatedRule {
    pub legacy: PathRule,
    pub modern: PathRule,
    pub finding: Finding,
}

#[derive(Debug, Clone, Copy)]
pub struct ToolProfile {
    pub tool: SimulatorToolId,
    pub detect: &'static [DetectRule],
    pub resolution: Resolution,
    /// Tools whose signatures overlap with this one; both matching is ambiguous.
    pub overlaps: &'static [SimulatorToolId],
    /// Paths that count as "this tool is configured" for mixed-tool checks.
    pub signature: &'static [PathRule],
    pub missing: Finding,
    /// Stacking tools only: files exist, but none at the root.
    pub missing_root: Option<Finding>,
    pub wrong_folder: Option<WrongFolderRule>,
    pub wrong_extension: Option<WrongExtensionRule>,
    pub deprecated: Option<DeprecatedRule>,
}

impl ToolProfile {
    /// Files that satisfy the tool's "has instructions at all" check.
    pub fn is_primary(&self, path: &str) -> bool {
        match self.resolution {
            Resolution::Stacking { file_name, .. } => is_named_file(path, file_name),
            Resolution::Tiered(tiers) => tiers.iter().any(|t| t.rule.matches(path)),
        }
    }

    /// Any file of the tool's instruction role, overrides included.
    pub fn is_role_file(&self, path: &str) -> bool {
        match self.resolution {
            Resolution::Stacking {
                file_name,
                override_name,
                ..
            } => {
                is_named_file(path, file_name)
                    || override_name.is_some_and(|name| is_named_file(path, name))
            }
            Resolution::Tiered(_) => self.is_primary(path),
        }
    }

    pub fn is_configured_by(&self, path: &str) -> bool {
        self.signature.iter().any(|r| r.matches(path))
    }
}

#[derive(Debug, Clone, Copy)]
/// Exact-case file name the tools require.
pub struct CaseRule {
    pub code: DiagnosticCode,
    /// Repository path (`Exact`) or file name in any directory (`Named`).
    pub rule: PathRule,
    pub tool_label: &'static str,
    pub suggestion: &'static str,
}

pub const CASE_RULES: &[CaseRule] = &[
    CaseRule {
        code: DiagnosticCode::CaseMismatchAgents,
        rule: PathRule::Named("AGENTS.md"),
        tool_label: "Codex CLI",
        suggestion: "Rename the file to AGENTS.md (uppercase).",
    },
    CaseRule {
        code: DiagnosticCode::CaseMismatchOverride,
        rule: PathRule::Named("AGENTS.override.md"),
        tool_label: "Codex CLI",
        suggestion: "Rename the file to AGENTS.override.md.",
    },
    CaseRule {
        code: DiagnosticCode::CaseMismatchClaude,
        rule: PathRule::Named("CLAUDE.md"),
        tool_label: "Claude Code",
        suggestion: "Rename the file to CLAUDE.md (uppercase).",
    },
    CaseRule {
        code: DiagnosticCode::CaseMismatchGemini,
        rule: PathRule::Named("GEMINI.md"),
        tool_label: "Gemini CLI",
        suggestion: "Rename the file to GEMINI.md (uppercase).",
    },
    CaseRule {
        code: DiagnosticCode::CaseMismatchCopilotRoot,
        rule: PathRule::Exact(".github/copilot-instructions.md"),
        tool_label: "Copilot",
        suggestion: "Rename the file to .github/copilot-instructions.md.",
    },
];

const COPILOT_ROOT: PathRule = PathRule::Exact(".github/copilot-instructions.md");
const COPILOT_CLI_SCOPED: PathRule = PathRule::Under {
    prefix: ".github/copilot-instructions/",
    suffix: ".instructions.md",
};
const COPILOT_CLI_AGENTS: PathRule = PathRule::Under {
    prefix: ".github/agents/",
    suffix: "",
};
const GITHUB_COPILOT_SCOPED: PathRule = PathRule::Under {
    prefix: ".github/instructions/",
    suffix: ".instructions.md",
};
const CURSOR_RULES_ANY: PathRule = PathRule::Under {
    prefix: ".cursor/rules/",
    suffix: "",
};
const CURSOR_RULES_MDC: PathRule = PathRule::Under {
    prefix: ".cursor/rules/",
    suffix: ".mdc",
};
const CURSOR_LEGACY: PathRule = PathRule::Exact(".cursorrules");

const CODEX: ToolProfile = ToolProfile {
    tool: SimulatorToolId::CodexCli,
    detect: &[
        DetectRule {
            rule: PathRule::Named("AGENTS.md"),
            weight: 3,
        },
        DetectRule {
            rule: PathRule::Named("AGENTS.override.md"),
            weight: 2,
        },
    ],
    resolution: Resolution::Stacking {
        file_name: "AGENTS.md",
        override_name: Some("AGENTS.override.md"),
        imports: false,
    },
    overlaps: &[],
    signature: &[PathRule::Named("AGENTS.md"), PathRule::Named("AGENTS.override.md")],
    missing: Finding {
        code: DiagnosticCode::MissingAgents,
        message: "No AGENTS.md files found. Codex CLI loads AGENTS.md from repo root and ancestor folders.",
        suggestion: "Add AGENTS.md at the repo root.",
        expected_path: Some("AGENTS.md"),
    },
    missing_root: Some(Finding {
        code: DiagnosticCode::MissingAgentsRoot,
        message: "No AGENTS.md at the repo root. Only scoped instructions were found.",
        suggestion: "Add AGENTS.md at the repo root for global instructions.",
        expected_path: Some("AGENTS.md"),
    }),
    wrong_folder: None,
    wrong_extension: None,
    deprecated: None,
};

const CLAUDE: ToolProfile = ToolProfile {
    tool: SimulatorToolId::ClaudeCode,
    detect: &[DetectRule {
        rule: PathRule::Named("CLAUDE.md"),
        weight: 3,
    }],
    resolution: Resolution::Stacking {
        file_name: "CLAUDE.md",
        override_name: None,
        imports: true,
    },
    overlaps: &[],
    signature: &[PathRule::Named("CLAUDE.md")],
    missing: Finding {
        code: DiagnosticCode::MissingClaude,
        message: "No CLAUDE.md files found. Claude Code reads CLAUDE.md from the repo root and parent folders.",
        suggestion: "Add CLAUDE.md at the repo root.",
        expected_path: Some("CLAUDE.md"),
    },
    missing_root: Some(Finding {
        code: DiagnosticCode::MissingClaudeRoot,
        message: "No CLAUDE.md at the repo root. Only scoped memory files were found.",
        suggestion: "Add CLAUDE.md at the repo root for global memory.",
        expected_path: Some("CLAUDE.md"),
    }),
    wrong_folder: None,
    wrong_extension: None,
    deprecated: None,
};

const GEMINI: ToolProfile = ToolProfile {
    tool: SimulatorToolId::GeminiCli,
    detect: &[DetectRule {
        rule: PathRule::Named("GEMINI.md"),
        weight: 3,
    }],
    resolution: Resolution::Stacking {
        file_name: "GEMINI.md",
        override_name: None,
        imports: false,
    },
    overlaps: &[],
    signature: &[PathRule::Named("GEMINI.md")],
    missing: Finding {
        code: DiagnosticCode::MissingGemini,
        message: "No GEMINI.md files found. Gemini CLI reads GEMINI.md from the repo root and parent folders.",
        suggestion: "Add GEMINI.md at the repo root.",
        expected_path: Some("GEMINI.md"),
    },
    missing_root: Some(Finding {
        code: DiagnosticCode::MissingGeminiRoot,
        message: "No GEMINI.md at the repo root. Only scoped files were found.",
        suggestion: "Add GEMINI.md at the repo root for global instructions.",
        expected_path: Some("GEMINI.md"),
    }),
    wrong_folder: None,
    wrong_extension: None,
    deprecated: None,
};

const COPILOT_CLI: ToolProfile = ToolProfile {
    tool: SimulatorToolId::CopilotCli,
    detect: &[
        DetectRule {
            rule: COPILOT_ROOT,
            weight: 2,
        },
        DetectRule {
            rule: COPILOT_CLI_SCOPED,
            weight: 2,
        },
        DetectRule {
            rule: COPILOT_CLI_AGENTS,
            weight: 3,
        },
    ],
    resolution: Resolution::Tiered(&[
        Tier {
            rule: COPILOT_ROOT,
            scoped: false,
            reason: "repository instructions (.github/copilot-instructions.md)",
        },
        Tier {
            rule: COPILOT_CLI_SCOPED,
            scoped: true,
            reason: "scoped instructions (applyTo matches cwd)",
        },
        Tier {
            rule: COPILOT_CLI_AGENTS,
            scoped: false,
            reason: "custom agent profile (.github/agents/*)",
        },
    ]),
    overlaps: &[SimulatorToolId::GithubCopilot],
    signature: &[COPILOT_CLI_SCOPED, COPILOT_CLI_AGENTS],
    missing: Finding {
        code: DiagnosticCode::MissingCopilotCli,
        message: "No Copilot CLI instruction files found.",
        suggestion: "Add .github/copilot-instructions.md or scoped files under .github/copilot-instructions/.",
        expected_path: Some(".github/copilot-instructions.md"),
    },
    missing_root: None,
    wrong_folder: Some(WrongFolderRule {
        found: GITHUB_COPILOT_SCOPED,
        own: COPILOT_CLI_SCOPED,
        finding: Finding {
            code: DiagnosticCode::WrongFolderCopilotCli,
            message: "Found .github/instructions/*.instructions.md, which Copilot CLI does not read.",
            suggestion: "Move scoped instructions to .github/copilot-instructions/.",
            expected_path: Some(".github/copilot-instructions/"),
        },
    }),
    wrong_extension: Some(WrongExtensionRule {
        dir_prefix: ".github/copilot-instructions/",
        suffix: ".instructions.md",
        subject: "Scoped Copilot CLI instructions",
        code: DiagnosticCode::WrongExtensionCopilotCli,
        suggestion: "Rename the file to use the .instructions.md suffix.",
    }),
    deprecated: None,
};

const GITHUB_COPILOT: ToolProfile = ToolProfile {
    tool: SimulatorToolId::GithubCopilot,
    detect: &[
        DetectRule {
            rule: COPILOT_ROOT,
            weight: 2,
        },
        DetectRule {
            rule: GITHUB_COPILOT_SCOPED,
            weight: 3,
        },
    ],
    resolution: Resolution::Tiered(&[
        Tier {
            rule: COPILOT_ROOT,
            scoped: false,
            reason: "repository instructions (.github/copilot-instructions.md)",
        },
        Tier {
            rule: GITHUB_COPILOT_SCOPED,
            scoped: true,
            reason: "path-specific instructions (applyTo matches cwd)",
        },
    ]),
    overlaps: &[SimulatorToolId::CopilotCli],
    signature: &[GITHUB_COPILOT_SCOPED],
    missing: Finding {
        code: DiagnosticCode::MissingGithubCopilot,
        message: "No GitHub Copilot instruction files found.",
        suggestion: "Add .github/copilot-instructions.md or .github/instructions/*.instructions.md.",
        expected_path: Some(".github/copilot-instructions.md"),
    },
    missing_root: None,
    wrong_folder: Some(WrongFolderRule {
        found: COPILOT_CLI_SCOPED,
        own: GITHUB_COPILOT_SCOPED,
        finding: Finding {
            code: DiagnosticCode::WrongFolderGithubCopilot,
            message: "Scoped files are under .github/copilot-instructions/, but GitHub Copilot expects .github/instructions/.",
            suggestion: "Move scoped instructions to .github/instructions/.",
            expected_path: Some(".github/instructions/"),
        },
    }),
    wrong_extension: Some(WrongExtensionRule {
        dir_prefix: ".github/instructions/",
        suffix: ".instructions.md",
        subject: "Scoped GitHub Copilot instructions",
        code: DiagnosticCode::WrongExtensionGithubCopilot,
        suggestion: "Rename the file to use the .instructions.md suffix.",
    }),
    deprecated: None,
};

const CURSOR: ToolProfile = ToolProfile {
    tool: SimulatorToolId::Cursor,
    detect: &[
        DetectRule {
            rule: CURSOR_RULES_ANY,
            weight: 3,
        },
        DetectRule {
            rule: CURSOR_LEGACY,
            weight: 3,
        },
    ],
    resolution: Resolution::Tiered(&[
        Tier {
            rule: CURSOR_RULES_MDC,
            scoped: false,
            reason: "cursor rule (.cursor/rules/*.mdc)",
        },
        Tier {
            rule: CURSOR_LEGACY,
            scoped: false,
            reason: "legacy cursor rules (.cursorrules, deprecated)",
        },
    ]),
    overlaps: &[],
    signature: &[CURSOR_RULES_ANY, CURSOR_LEGACY],
    missing: Finding {
        code: DiagnosticCode::MissingCursor,
        message: "No Cursor rule files found.",
        suggestion: "Add rule files under .cursor/rules/ (for example .cursor/rules/general.mdc).",
        expected_path: Some(".cursor/rules/"),
    },
    missing_root: None,
    wrong_folder: None,
    wrong_extension: Some(WrongExtensionRule {
        dir_prefix: ".cursor/rules/",
        suffix: ".mdc",
        subject: "Cursor rule files",
        code: DiagnosticCode::WrongExtensionCursor,
        suggestion: "Rename the rule file to use the .mdc extension.",
    }),
    deprecated: Some(DeprecatedRule {
        legacy: CURSOR_LEGACY,
        modern: CURSOR_RULES_ANY,
        finding: Finding {
            code: DiagnosticCode::DeprecatedCursorrules,
            message: "Legacy .cursorrules found alongside .cursor/rules.",
            suggestion: "Move legacy rules into .cursor/rules and remove .cursorrules.",
            expected_path: Some(".cursor/rules/"),
        },
    }),
};

pub static PROFILES: [ToolProfile; 6] = [CODEX, CLAUDE, GEMINI, COPILOT_CLI, GITHUB_COPILOT, CURSOR];

/// Rule table for a tool.
pub fn profile(tool: SimulatorToolId) -> &'static ToolProfile {
    match tool {
        SimulatorToolId::CodexCli => &PROFILES[0],
        SimulatorToolId::ClaudeCode => &PROFILES[1],
        SimulatorToolId::GeminiCli => &PROFILES[2],
        SimulatorToolId::CopilotCli => &PROFILES[3],
        SimulatorToolId::GithubCopilot => &PROFILES[4],
        SimulatorToolId::Cursor => &PROFILES[5],
    }
}
