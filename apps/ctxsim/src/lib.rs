//! ctxsim core library.
//!
//! Answers, for a repository and a coding-agent tool, which instruction
//! files get loaded for a working directory, in what order, and what is
//! wrong with the setup.
//!
//! High-level modules:
//! - `ingest`: ZIP, file-list, directory, and pasted-listing ingestion into a `RepoTree`.
//! - `rules`: Declarative per-tool rule tables.
//! - `detect`: Tool detection from observed paths.
//! - `simulate`: Context resolution (loaded, shadowed, warnings).
//! - `imports`: Claude Code `@path` import graph.
//! - `front_matter`: YAML front matter and `applyTo` globs.
//! - `diagnostics`: Static naming, placement, and import diagnostics.
//! - `content_lint`: Content checks for instruction files.
//! - `worker`: Message-passing scan façade and background worker.
//! - `golden`: Golden fixture suites for the resolver.
//! - `models`: Shared data models.
//! - `config`, `cli`, `output`: Configuration, argument parsing, printers.
//! - `error`, `utils`: Error types and path helpers.
pub mod cli;
pub mod config;
pub mod content_lint;
pub mod detect;
pub mod diagnostics;
pub mod error;
pub mod front_matter;
pub mod golden;
pub mod imports;
pub mod ingest;
pub mod models;
pub mod output;
pub mod rules;
pub mod simulate;
pub mod utils;
pub mod worker;
