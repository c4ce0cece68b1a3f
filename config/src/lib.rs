//! Configuration loading for Quartet.
//!
//! Reads `~/.quartet/config.toml` (or the file named by `QUARTET_CONFIG`).
//! Every section is optional; a missing file means defaults everywhere.
//!
//! ```toml
//! [puzzle]
//! sheet_url = "https://docs.google.com/spreadsheets/.../pub?output=csv"
//! api_url = "https://example.com/api/puzzle"
//! sheet_path = "~/puzzles.csv"
//! timeout_secs = 10
//!
//! [calendar]
//! utc_offset_minutes = 300
//!
//! [storage]
//! enabled = true
//! path = "${HOME}/.quartet/session.json"
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Published sheet the daily puzzles are maintained in.
pub const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vQbFVnlcBrpSGHk8PSuGophCOSUl5N-U9HBI6G352dZPgGlZGK1AdA0xduUeqPSfSW-8Om7C8GV8rcb/pub?gid=1108981138&single=true&output=csv";

/// Asia/Almaty (UTC+5), where the daily puzzle rolls over.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 5 * 60;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const CONFIG_ENV_VAR: &str = "QUARTET_CONFIG";

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct QuartetConfig {
    pub puzzle: Option<PuzzleConfig>,
    pub calendar: Option<CalendarConfig>,
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid {field} {value:?}: {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("utc_offset_minutes must be within a day, got {0}")]
    InvalidOffset(i32),
}

/// Where the daily puzzle comes from.
///
/// ```toml
/// [puzzle]
/// sheet_url = "https://..."
/// timeout_secs = 10
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct PuzzleConfig {
    /// CSV export of the puzzle sheet.
    pub sheet_url: Option<String>,
    /// JSON puzzle endpoint; takes precedence over `sheet_url`.
    pub api_url: Option<String>,
    /// Local CSV file; takes precedence over both URLs.
    pub sheet_path: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarConfig {
    /// Offset of the civil timezone from UTC, east positive.
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Persist the session between runs. Default: true.
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

/// Resolved puzzle feed selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    File(PathBuf),
    Api(Url),
    Sheet(Url),
}

/// Expand `${VAR}` references; unset variables become empty.
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                out.push_str(&env::var(&after[..end]).unwrap_or_default());
                rest = &after[end + 1..];
            }
            _ => {
                out.push_str("${");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let value = expand_env_vars(raw);
    Url::parse(value.trim()).map_err(|source| ConfigError::InvalidUrl {
        field,
        value,
        source,
    })
}

impl QuartetConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!(path = %path.display(), "Failed to read config: {source}");
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map(Some).map_err(|source| {
            tracing::warn!(path = %path.display(), "Failed to parse config: {source}");
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn feed(&self) -> Result<FeedSource, ConfigError> {
        let puzzle = self.puzzle.as_ref();
        if let Some(path) = puzzle.and_then(|p| p.sheet_path.as_deref()) {
            return Ok(FeedSource::File(PathBuf::from(expand_env_vars(path))));
        }
        if let Some(url) = puzzle.and_then(|p| p.api_url.as_deref()) {
            return parse_url("api_url", url).map(FeedSource::Api);
        }
        let sheet = puzzle
            .and_then(|p| p.sheet_url.as_deref())
            .unwrap_or(DEFAULT_SHEET_URL);
        parse_url("sheet_url", sheet).map(FeedSource::Sheet)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        let secs = self
            .puzzle
            .as_ref()
            .and_then(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn utc_offset_minutes(&self) -> Result<i32, ConfigError> {
        let minutes = self
            .calendar
            .as_ref()
            .and_then(|c| c.utc_offset_minutes)
            .unwrap_or(DEFAULT_UTC_OFFSET_MINUTES);
        if minutes.abs() >= 24 * 60 {
            return Err(ConfigError::InvalidOffset(minutes));
        }
        Ok(minutes)
    }

    /// Path of the persisted session, or `None` when persistence is disabled.
    #[must_use]
    pub fn session_path(&self) -> Option<PathBuf> {
        let storage = self.storage.as_ref();
        if storage.is_some_and(|s| !s.enabled) {
            return None;
        }
        match storage.and_then(|s| s.path.as_deref()) {
            Some(path) => Some(PathBuf::from(expand_env_vars(path))),
            None => data_dir().map(|dir| dir.join("session.json")),
        }
    }
}

/// `~/.quartet`, home of the config file, session record and logs.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".quartet"))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }
    data_dir().map(|dir| dir.join("config.toml"))
}
