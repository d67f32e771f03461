//! Error types for ingestion and the CLI surface.
//!
//! Only ingestion can fail. Detection, resolution, diagnostics, and lint
//! are total over a well-formed `RepoTree` and report findings as data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZipScanErrorKind {
    /// A byte, file-count, or compression-ratio cap was exceeded.
    Oversize,
    /// The archive or one of its entries could not be read.
    Corrupt,
}

impl ZipScanErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZipScanErrorKind::Oversize => "oversize",
            ZipScanErrorKind::Corrupt => "corrupt",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
/// Typed archive rejection. Never degraded into an empty tree.
pub struct ZipScanError {
    pub kind: ZipScanErrorKind,
    pub message: String,
}

impl ZipScanError {
    pub fn oversize(message: impl Into<String>) -> Self {
        Self {
            kind: ZipScanErrorKind::Oversize,
            message: message.into(),
        }
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self {
            kind: ZipScanErrorKind::Corrupt,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] ZipScanError),

    #[error("invalid fixture file: {0}")]
    Fixture(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(String),
}
