//! User settings for the tip feature
//!
//! Stored as JSON in the platform config directory. Missing keys take
//! their defaults so older files keep loading.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::validation::{DEFAULT_LOG_LEVEL, LOG_LEVELS};
use crate::persistence::JsonFileStore;
use crate::tips::TipSource;
use crate::version::{AppVersion, VersionParseError, VersionTuple};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Show a tip when the host starts
    #[serde(default = "default_show_on_startup")]
    pub show_on_startup: bool,

    /// External tip resource (bundled tips when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips_path: Option<PathBuf>,

    /// Session record location (data dir when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_path: Option<PathBuf>,

    /// Running host version used for gating (crate version when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Something noticed while loading settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsIssue {
    CreatedDefault { path: PathBuf },
    DefaultWriteFailed { error: String },
    UnknownLogLevel { value: String },
    InvalidAppVersion(VersionParseError),
}

impl SettingsIssue {
    /// Log at the level the issue deserves
    pub fn report(&self) {
        match self {
            SettingsIssue::CreatedDefault { path } => {
                info!(path = %path.display(), "Settings file not found, created default")
            }
            SettingsIssue::DefaultWriteFailed { error } => {
                warn!(error = %error, "Failed to write default settings")
            }
            SettingsIssue::UnknownLogLevel { value } => {
                warn!(log_level = %value, using = DEFAULT_LOG_LEVEL, "Unknown log_level, using default")
            }
            SettingsIssue::InvalidAppVersion(e) => {
                warn!(error = %e, "app_version is not a dotted numeric version")
            }
        }
    }
}

fn default_show_on_startup() -> bool {
    true
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_on_startup: default_show_on_startup(),
            tips_path: None,
            state_path: None,
            app_version: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Load settings, writing defaults on first run
    /// Problems come back as [`SettingsIssue`]s so they can be reported once logging is up
    pub fn load(path: &Path) -> Result<(Self, Vec<SettingsIssue>)> {
        if !path.exists() {
            let settings = Settings::default();
            let mut issues = vec![SettingsIssue::CreatedDefault { path: path.to_path_buf() }];
            // Read-only config dirs still get a working default
            if let Err(e) = settings.save(path) {
                issues.push(SettingsIssue::DefaultWriteFailed { error: format!("{e:#}") });
            }
            return Ok((settings, issues));
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;

        let mut settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings JSON from {:?}", path))?;

        let issues = settings.validate();
        Ok((settings, issues))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize settings to JSON")?;

        fs::write(path, json)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;

        info!(path = %path.display(), "Saved settings");
        Ok(())
    }

    /// Repair values that cannot be used as-is, returning what was wrong
    fn validate(&mut self) -> Vec<SettingsIssue> {
        let mut issues = Vec::new();

        let level = self.log_level.to_lowercase();
        if LOG_LEVELS.contains(&level.as_str()) {
            self.log_level = level;
        } else {
            issues.push(SettingsIssue::UnknownLogLevel { value: self.log_level.clone() });
            self.log_level = default_log_level();
        }

        // Kept as-is: gated tips fail open under an unparseable version
        if let Some(version) = &self.app_version
            && let Err(e) = version.parse::<VersionTuple>()
        {
            issues.push(SettingsIssue::InvalidAppVersion(e));
        }

        issues
    }

    pub fn tip_source(&self) -> TipSource {
        TipSource::from_option(self.tips_path.clone())
    }

    pub fn session_store(&self) -> JsonFileStore {
        self.state_path
            .clone()
            .map_or_else(JsonFileStore::default, JsonFileStore::new)
    }

    pub fn running_version(&self) -> AppVersion {
        self.app_version
            .as_deref()
            .map_or_else(AppVersion::current, AppVersion::new)
    }
}
