//! Tip database: parsing the plain-text resource into ordered entries
//!
//! An entry has no identity of its own. Selection state refers to entries
//! by their position, which is stable for a given resource revision.

pub mod builder;
pub mod tokenizer;

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::constants::grammar::LINE_BREAK_MARKER;
use crate::error::{Diagnostic, Result, TipError};

pub use builder::{EntryBuilder, ParseReport, parse};

/// Resource compiled into the binary
pub const BUNDLED_TIPS: &str = include_str!("../../resources/tips.txt");

/// One hint record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TipEntry {
    /// Never empty; may contain literal `\n` markers
    pub text: String,
    /// Script forwarded verbatim to the host interpreter
    pub command: Option<String>,
    /// Dotted version string, validated lazily by the version filter
    pub min_version: Option<String>,
    pub image_url: Option<String>,
}

impl TipEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            command: None,
            min_version: None,
            image_url: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_min_version(mut self, version: impl Into<String>) -> Self {
        self.min_version = Some(version.into());
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Text with `\n` markers turned into real line breaks
    pub fn display_text(&self) -> String {
        self.text.replace(LINE_BREAK_MARKER, "\n")
    }

    /// Whether the presenter should offer a "try it" action
    pub fn has_action(&self) -> bool {
        self.command.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

/// Where the raw resource text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TipSource {
    Bundled,
    File(PathBuf),
}

impl TipSource {
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(TipSource::Bundled, TipSource::File)
    }

    /// Read the raw text in a single scoped acquisition
    pub fn read(&self) -> Result<String> {
        match self {
            TipSource::Bundled => Ok(BUNDLED_TIPS.to_string()),
            TipSource::File(path) => {
                fs::read_to_string(path).map_err(|source| TipError::ResourceUnavailable {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

impl std::fmt::Display for TipSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TipSource::Bundled => write!(f, "<bundled>"),
            TipSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Ordered, immutable list of tips plus the revision tag that keys session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipDatabase {
    entries: Vec<TipEntry>,
    revision: String,
}

impl TipDatabase {
    /// Parse resource text; dropped records come back as diagnostics
    pub fn parse(text: &str) -> (Self, Vec<Diagnostic>) {
        let report = parse(text);
        let database = Self {
            entries: report.entries,
            revision: content_revision(text),
        };
        (database, report.diagnostics)
    }

    pub fn load(source: &TipSource) -> Result<(Self, Vec<Diagnostic>)> {
        let text = source.read()?;
        let (database, diagnostics) = Self::parse(&text);
        info!(
            source = %source,
            tips = database.len(),
            skipped = diagnostics.len(),
            revision = %database.short_revision(),
            "Loaded tip database"
        );
        Ok((database, diagnostics))
    }

    /// Database with no tips, used when the resource is unavailable
    pub fn empty() -> Self {
        Self::from_entries(Vec::new())
    }

    pub fn from_entries(entries: Vec<TipEntry>) -> Self {
        let revision = entries_revision(&entries);
        Self { entries, revision }
    }

    /// Replace the content hash with a host-supplied revision tag
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn short_revision(&self) -> &str {
        let end = self.revision.len().min(12);
        self.revision.get(..end).unwrap_or(&self.revision)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TipEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[TipEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &TipEntry)> {
        self.entries.iter().enumerate()
    }
}

fn content_revision(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

fn entries_revision(entries: &[TipEntry]) -> String {
    let mut hasher = Sha256::new();
    for entry in entries {
        for field in [
            Some(entry.text.as_str()),
            entry.command.as_deref(),
            entry.min_version.as_deref(),
            entry.image_url.as_deref(),
        ] {
            hasher.update(field.unwrap_or("").as_bytes());
            hasher.update([0u8]);
        }
    }
    format!("{:x}", hasher.finalize())
}
