use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, TipError};
use crate::selection::SelectionState;
use crate::tips::TipDatabase;

/// Selection state as persisted between runs
/// Keyed by the database revision so a changed resource never inherits stale indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub revision: String,

    #[serde(flatten)]
    pub state: SelectionState,
}

impl SessionRecord {
    pub fn new(database: &TipDatabase, state: SelectionState) -> Self {
        Self {
            revision: database.revision().to_string(),
            state,
        }
    }
}

/// Storage backend for the session record
pub trait SessionStore {
    /// `Ok(None)` when nothing has been stored yet
    fn read(&self) -> Result<Option<SessionRecord>>;

    fn write(&mut self, record: &SessionRecord) -> Result<()>;

    fn clear(&mut self) -> Result<()>;
}

/// Restore the selection state for `database`
/// Unreadable records and records for another revision start a fresh cycle
pub fn restore_state(store: &dyn SessionStore, database: &TipDatabase) -> SelectionState {
    match store.read() {
        Ok(Some(record)) if record.revision == database.revision() => {
            let mut state = record.state;
            state.prune(database.len());
            debug!(shown = state.shown.len(), "Restored session state");
            state
        }
        Ok(Some(record)) => {
            info!(
                stored = %record.revision,
                current = %database.revision(),
                "Tip database changed, starting a new cycle"
            );
            SelectionState::new()
        }
        Ok(None) => SelectionState::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read session state, starting a new cycle");
            SelectionState::new()
        }
    }
}

/// JSON file in the user's data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::STATE_FILENAME);
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> TipError {
        TipError::StateIo {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl SessionStore for JsonFileStore {
    fn read(&self) -> Result<Option<SessionRecord>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn write(&mut self, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), shown = record.state.shown.len(), "Saved session state");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Cleared session state");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Session-only store (nothing survives the process)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub record: Option<SessionRecord>,
}

impl SessionStore for MemoryStore {
    fn read(&self) -> Result<Option<SessionRecord>> {
        Ok(self.record.clone())
    }

    fn write(&mut self, record: &SessionRecord) -> Result<()> {
        self.record = Some(record.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.record = None;
        Ok(())
    }
}
