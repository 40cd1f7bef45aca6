//! Panel configuration loaded from `~/.latch/config.toml`.
//!
//! A missing file is not an error: the panel comes up unregistered and
//! shows the registration hint. A malformed file IS an error, because
//! silently ignoring a typo in the server URL would strand the panel on
//! the default host.
//!
//! ```toml
//! [server]
//! url = "http://10.0.0.12:8000"
//! timeout_seconds = 10
//!
//! [user]
//! id = "f3a9c0d2"
//!
//! [panel]
//! refresh_seconds = 60
//! notice_seconds = 3
//! ascii_only = false
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use latch_types::UserId;
use serde::Deserialize;
use thiserror::Error;

use crate::driver::PanelOptions;

/// Service host used when `[server] url` is absent.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REFRESH_SECS: u64 = 60;
const DEFAULT_NOTICE_SECS: u64 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}

/// On-disk panel configuration. Every field is optional so an empty file
/// (or none at all) still yields a usable panel.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LatchConfig {
    pub server: ServerSection,
    pub user: UserSection,
    pub panel: PanelSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserSection {
    pub id: Option<String>,
}

// The stored identifier is a credential in all but name.
impl std::fmt::Debug for UserSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSection")
            .field("id", &self.id.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PanelSection {
    pub refresh_seconds: Option<u64>,
    pub notice_seconds: Option<u64>,
    pub ascii_only: bool,
}

impl LatchConfig {
    /// Loads the panel config, or `Ok(None)` when there is none to load.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    /// Loads from an explicit path; the file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config file at {}: {source}", path.display());
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        toml::from_str(&raw).map_err(|source| {
            tracing::warn!("Failed to parse config file at {}: {source}", path.display());
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Stored identifier, if one is present and non-blank.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user.id.as_deref().and_then(|id| UserId::new(id).ok())
    }

    #[must_use]
    pub fn server_url(&self) -> String {
        self.server
            .url
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    #[must_use]
    pub fn timeout_secs(&self) -> u64 {
        self.server.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    #[must_use]
    pub fn panel_options(&self) -> PanelOptions {
        // A zero period would panic in tokio::time::interval.
        let refresh_seconds = self
            .panel
            .refresh_seconds
            .unwrap_or(DEFAULT_REFRESH_SECS)
            .max(1);
        let notice_seconds = self.panel.notice_seconds.unwrap_or(DEFAULT_NOTICE_SECS);
        PanelOptions {
            refresh_period: Duration::from_secs(refresh_seconds),
            notice_ttl: Duration::from_secs(notice_seconds),
        }
    }

    #[must_use]
    pub fn ascii_only(&self) -> bool {
        self.panel.ascii_only
    }
}

/// Config file location. `LATCH_CONFIG` overrides `~/.latch/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("LATCH_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".latch").join("config.toml"))
}
