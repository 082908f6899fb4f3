//! Configuration for tipwheel
//!
//! - **settings**: user-editable JSON settings (startup toggle, paths, version override)

pub mod settings;

pub use settings::{Settings, SettingsIssue};
