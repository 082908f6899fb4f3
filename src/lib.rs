//! Tip-of-the-day engine
//!
//! Parses a plain-text tip database, gates tips by the running application
//! version and hands out every eligible tip once before repeating any.

#![forbid(unsafe_code)]

pub mod config;
pub mod constants;
pub mod error;
pub mod persistence;
pub mod presenter;
pub mod selection;
pub mod service;
pub mod tips;
pub mod version;

pub use error::{Diagnostic, SelectError, TipError};
pub use persistence::{JsonFileStore, MemoryStore, SessionRecord, SessionStore};
pub use presenter::{CommandSink, ConsolePresenter, Presenter};
pub use selection::{Pick, SelectionState, next_tip};
pub use service::TipService;
pub use tips::{TipDatabase, TipEntry, TipSource};
pub use version::{AppVersion, is_eligible};
