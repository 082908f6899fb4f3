use std::path::PathBuf;

use thiserror::Error;

/// Non-fatal findings reported while loading or filtering tips
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A record was dropped; loading continued
    #[error("skipped record starting at line {line}: {reason}")]
    ParseSkip { line: usize, reason: SkipReason },

    /// An entry's minimum version could not be parsed; it applies to every version
    #[error("tip {index} has unparseable version '{version}', treating it as eligible")]
    VersionParseFallback { index: usize, version: String },
}

impl Diagnostic {
    pub fn is_parse_skip(&self) -> bool {
        matches!(self, Diagnostic::ParseSkip { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Text was empty or whitespace-only after all continuations
    EmptyText,
    /// Optional fields appeared before any `tip=` line
    MissingTip,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyText => write!(f, "tip text is empty"),
            SkipReason::MissingTip => write!(f, "fields appear before any tip= line"),
        }
    }
}

/// Why no tip could be handed to the presenter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    #[error("tip database is empty")]
    EmptyDatabase,

    #[error("no tip is eligible for version {running}")]
    NoEligibleTip { running: String },
}

#[derive(Error, Debug)]
pub enum TipError {
    #[error("tip resource {path} is unavailable: {source}")]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session state I/O error at {path}: {source}")]
    StateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session state JSON error: {0}")]
    StateJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TipError>;
