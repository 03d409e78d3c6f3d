//! Shell configuration

use crate::error::{TabwaveError, TabwaveResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Address used for new tabs and as the redirect target for placeholder input.
pub const DEFAULT_HOME: &str = "https://duckduckgo.com/";

/// Reserved domain that is never navigated to directly.
pub const DEFAULT_PLACEHOLDER_DOMAIN: &str = "example.com";

/// Endpoint that generates page content for address-bar submissions.
pub const DEFAULT_CONTENT_ENDPOINT: &str = "https://tabwave.app/api/page";

/// Maximum number of global history entries kept.
pub const DEFAULT_HISTORY_CAP: usize = 200;

/// Key-value slot the snapshot is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "tabwave.state";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TABWAVE_DATA_DIR";

/// Which key-value backend holds the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local map, nothing survives a restart
    Memory,
    /// One JSON file per key under the data directory
    #[default]
    Json,
    /// SQLite database in the data directory
    Sqlite,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Json => "json",
            Self::Sqlite => "sqlite",
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = TabwaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "json" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(TabwaveError::config(format!(
                "unknown storage backend `{}`",
                other
            ))),
        }
    }
}

/// Shell configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Data directory for persistent storage
    #[serde(skip)]
    pub data_dir: PathBuf,

    /// Default address for new tabs and the home action
    pub home: String,

    /// Hostname that gets redirected instead of navigated
    pub placeholder_domain: String,

    /// Address substituted for placeholder-domain input
    pub redirect_target: String,

    /// Content-generation endpoint for address-bar submissions
    pub content_endpoint: String,

    /// Maximum global history entries
    pub history_cap: usize,

    /// Key the snapshot is persisted under
    pub storage_key: String,

    /// Storage backend
    pub backend: StorageBackend,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            home: DEFAULT_HOME.to_string(),
            placeholder_domain: DEFAULT_PLACEHOLDER_DOMAIN.to_string(),
            redirect_target: DEFAULT_HOME.to_string(),
            content_endpoint: DEFAULT_CONTENT_ENDPOINT.to_string(),
            history_cap: DEFAULT_HISTORY_CAP,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            backend: StorageBackend::default(),
        }
    }
}

impl ShellConfig {
    /// Configuration rooted at `data_dir`, all other fields default.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Path of the config file inside the data directory
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    /// Load configuration from file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let data_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(default_data_dir);

        let mut config = if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                    log::warn!("Ignoring invalid config {}: {}", path.display(), err);
                    Self::default()
                }),
                Err(err) => {
                    log::warn!("Failed to read config {}: {}", path.display(), err);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.data_dir = data_dir;
        config
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> TabwaveResult<()> {
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Check that the configured addresses and limits are usable
    pub fn validate(&self) -> TabwaveResult<()> {
        url::Url::parse(&self.home)?;
        url::Url::parse(&self.redirect_target)?;
        url::Url::parse(&self.content_endpoint)?;

        if self.placeholder_domain.trim().is_empty() {
            return Err(TabwaveError::config("placeholder domain is empty"));
        }
        if self.history_cap == 0 {
            return Err(TabwaveError::config("history cap must be at least 1"));
        }
        if self.storage_key.trim().is_empty() {
            return Err(TabwaveError::config("storage key is empty"));
        }
        // Must also be usable as a file name by the json backend.
        let portable = self.storage_key.chars().all(|ch| {
            ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '.' | '-' | '_')
        });
        if !portable {
            return Err(TabwaveError::config(format!(
                "storage key `{}` may only use a-z, 0-9, `.`, `-` and `_`",
                self.storage_key
            )));
        }
        Ok(())
    }
}

/// Get data directory, with fallback
pub fn default_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("tabwave");
    }

    PathBuf::from(".tabwave")
}
