//! Version gating
//!
//! Versions are dotted numeric tuples compared element-wise, with missing
//! trailing components treated as zero (`1.2` == `1.2.0`). Inputs come from
//! a hand-edited file, so anything that does not parse fails open.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::version::{COMPONENT_SEPARATOR, PREFIX, SUFFIX_SEPARATORS};
use crate::error::Diagnostic;
use crate::tips::{TipDatabase, TipEntry};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{input}' is not a dotted numeric version")]
pub struct VersionParseError {
    pub input: String,
}

#[derive(Debug, Clone)]
pub struct VersionTuple(Vec<u64>);

impl VersionTuple {
    pub fn components(&self) -> &[u64] {
        &self.0
    }
}

impl FromStr for VersionTuple {
    type Err = VersionParseError;

    /// Accepts an optional leading `v` and ignores a `-pre`/`+build` suffix
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = || VersionParseError { input: input.to_string() };

        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix(PREFIX).unwrap_or(trimmed);
        let core = trimmed
            .split(SUFFIX_SEPARATORS)
            .next()
            .unwrap_or_default();
        if core.is_empty() {
            return Err(err());
        }

        core.split(COMPONENT_SEPARATOR)
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(err());
                }
                part.parse::<u64>().map_err(|_| err())
            })
            .collect::<Result<Vec<_>, _>>()
            .map(VersionTuple)
    }
}

impl Ord for VersionTuple {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|i| {
                let a = self.0.get(i).copied().unwrap_or(0);
                let b = other.0.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for VersionTuple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionTuple {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionTuple {}

impl fmt::Display for VersionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Version of the running host application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppVersion {
    raw: String,
    parsed: Option<VersionTuple>,
}

impl AppVersion {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = raw
            .parse::<VersionTuple>()
            .inspect_err(|e| warn!(error = %e, "Running version is unparseable, version gates are disabled"))
            .ok();
        Self { raw, parsed }
    }

    /// This crate's own version
    pub fn current() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tuple(&self) -> Option<&VersionTuple> {
        self.parsed.as_ref()
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Outcome of checking one entry against the running version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// No minimum version
    Open,
    Satisfied,
    TooOld,
    /// Minimum version unparseable; fails open
    MinVersionFallback,
    /// Running version unparseable; fails open
    RunningUnknown,
}

impl Gate {
    pub fn is_eligible(self) -> bool {
        !matches!(self, Gate::TooOld)
    }
}

/// Pure gate check, no reporting
pub fn gate(min_version: Option<&str>, running: &AppVersion) -> Gate {
    let Some(min_version) = min_version else {
        return Gate::Open;
    };
    let Ok(required) = min_version.parse::<VersionTuple>() else {
        return Gate::MinVersionFallback;
    };
    match running.tuple() {
        None => Gate::RunningUnknown,
        Some(running) if *running >= required => Gate::Satisfied,
        Some(_) => Gate::TooOld,
    }
}

/// Whether `entry` may be shown under `running`
/// Unparseable minimums are reported once at load by [`audit`]
pub fn is_eligible(entry: &TipEntry, running: &AppVersion) -> bool {
    let result = gate(entry.min_version.as_deref(), running);
    if result == Gate::MinVersionFallback {
        debug!(
            version = entry.min_version.as_deref().unwrap_or_default(),
            "Tip has unparseable minimum version, treating it as eligible"
        );
    }
    result.is_eligible()
}

/// Entries whose minimum version will fail open, independent of the running version
pub fn audit(database: &TipDatabase) -> Vec<Diagnostic> {
    database
        .iter()
        .filter_map(|(index, entry)| {
            let version = entry.min_version.as_deref()?;
            version.parse::<VersionTuple>().err().map(|_| Diagnostic::VersionParseFallback {
                index,
                version: version.to_string(),
            })
        })
        .collect()
}
