//! User settings.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::StoreError;
use crate::persistence::{default_archive_dir, default_settings_path, load_json_or_default, save_json};

// ============================================================================
// Settings
// ============================================================================

/// Defaults applied to every run unless a command-line flag overrides them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Archive directory; the cache directory when unset.
    pub archive_dir: Option<PathBuf>,

    /// Log level when `--verbose` is not given.
    pub log_level: LogLevel,

    /// Print one item per line instead of pretty JSON.
    pub json_lines: bool,
}

impl Settings {
    /// Loads settings from the default location.
    pub async fn load() -> Self {
        Self::load_from(&default_settings_path()).await
    }

    /// Loads settings from `path`, falling back to defaults.
    pub async fn load_from(path: &Path) -> Self {
        load_json_or_default(path).await
    }

    /// Saves settings to `path`.
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await?;
        info!(path = %path.display(), "Settings saved");
        Ok(())
    }

    /// Resolved archive directory.
    pub fn archive_dir(&self) -> PathBuf {
        self.archive_dir.clone().unwrap_or_else(default_archive_dir)
    }
}

// ============================================================================
// Log Level
// ============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `tracing-subscriber`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(StoreError::Config(format!("unknown log level '{other}'"))),
        }
    }
}
