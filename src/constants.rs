//! Application-wide constants
//!
//! Field keys of the tip resource grammar, file locations and the
//! limits applied when validating settings.

/// Tip resource grammar
pub mod grammar {
    /// Opens a new record; the value is the tip text
    pub const TIP_KEY: &str = "tip";

    /// Command script replayed when the user asks for the tip's action
    pub const CMD_KEY: &str = "cmd";

    /// Minimum application version the tip applies to
    pub const VERSION_KEY: &str = "version";

    /// Supplementary media URI
    pub const IMG_KEY: &str = "img";

    /// Separator between key and value on a field line
    pub const DELIMITER: char = '=';

    /// First non-whitespace character of a comment line
    pub const COMMENT_PREFIX: char = '#';

    /// Line-break marker embedded in tip text (two characters, not a newline)
    pub const LINE_BREAK_MARKER: &str = "\\n";
}

/// Version parsing
pub mod version {
    /// Separator between numeric components
    pub const COMPONENT_SEPARATOR: char = '.';

    /// Characters that start a pre-release or build suffix
    pub const SUFFIX_SEPARATORS: [char; 2] = ['-', '+'];

    /// Optional prefix accepted in front of the first component
    pub const PREFIX: char = 'v';
}

/// Config and state file locations
pub mod config {
    /// Directory under the platform config/data dir
    pub const APP_DIR: &str = "tipwheel";

    /// Settings file name
    pub const FILENAME: &str = "config.json";

    /// Session record file name
    pub const STATE_FILENAME: &str = "session.json";
}

/// Settings validation
pub mod validation {
    /// Log levels accepted in settings and LOG_LEVEL
    pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "info";
}
