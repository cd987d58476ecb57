//! Configuration management for notekeeper.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "notekeeper";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "notes.db";

/// Key the note collection is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "notes-app-data";

/// Endpoint of the notes resource on the mock server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/notes";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `NOTEKEEPER_`, sections split by `__`)
/// 2. TOML config file at `~/.config/notekeeper/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which backend is active.
    pub backend: BackendConfig,
    /// Local store configuration.
    pub local: LocalConfig,
    /// Remote resource configuration.
    pub remote: RemoteConfig,
    /// List rendering configuration.
    pub display: DisplayConfig,
    /// Mock server configuration.
    pub server: ServerConfig,
}

/// The persistence backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Key-value store on the local disk.
    #[default]
    Local,
    /// REST resource collection.
    Remote,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Backend selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Active backend.
    pub kind: BackendKind,
}

/// Local store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/notekeeper/notes.db`
    pub database_path: Option<PathBuf>,
    /// Key holding the JSON-encoded note collection.
    pub storage_key: String,
    /// Largest value the store accepts, in bytes.
    pub max_value_bytes: usize,
}

/// Remote resource configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// URL of the notes resource collection.
    pub base_url: String,
    /// Pause before re-fetching after a create or update, in milliseconds.
    /// Set to 0 for servers that are immediately consistent.
    pub refetch_delay_ms: u64,
}

/// List rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Characters of content shown in the list preview.
    pub preview_chars: usize,
    /// `strftime` format for list dates.
    pub date_format: String,
}

/// Mock server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,
    /// JSON database file; in-memory only when unset.
    pub db_path: Option<PathBuf>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            max_value_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refetch_delay_ms: 300,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            preview_chars: 50,
            date_format: "%d/%m/%Y".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3001".to_string(),
            db_path: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `NOTEKEEPER_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("NOTEKEEPER_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.local.storage_key.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "local.storage_key must not be empty".to_string(),
            });
        }

        if self.local.max_value_bytes == 0 {
            return Err(Error::ConfigValidation {
                message: "local.max_value_bytes must be greater than 0".to_string(),
            });
        }

        let base = self.remote.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(Error::ConfigValidation {
                message: format!("remote.base_url must be an http(s) URL: {base}"),
            });
        }

        if self.display.preview_chars == 0 {
            return Err(Error::ConfigValidation {
                message: "display.preview_chars must be greater than 0".to_string(),
            });
        }

        let bad_format = chrono::format::StrftimeItems::new(&self.display.date_format)
            .any(|item| matches!(item, chrono::format::Item::Error));
        if bad_format {
            return Err(Error::ConfigValidation {
                message: format!(
                    "display.date_format is not a valid strftime format: {}",
                    self.display.date_format
                ),
            });
        }

        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(Error::ConfigValidation {
                message: format!("server.bind is not a socket address: {}", self.server.bind),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.local
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the re-fetch delay as a Duration, `None` when disabled.
    #[must_use]
    pub fn refetch_delay(&self) -> Option<Duration> {
        if self.remote.refetch_delay_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.remote.refetch_delay_ms))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.backend.kind, BackendKind::Local);
        assert_eq!(config.local.storage_key, "notes-app-data");
        assert_eq!(config.remote.base_url, "http://localhost:3001/notes");
        assert_eq!(config.display.preview_chars, 50);
    }

    #[test]
    fn test_default_local_config() {
        let local = LocalConfig::default();

        assert!(local.database_path.is_none());
        assert_eq!(local.max_value_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_default_remote_config() {
        let remote = RemoteConfig::default();
        assert_eq!(remote.refetch_delay_ms, 300);
    }

    #[test]
    fn test_default_server_config() {
        let server = ServerConfig::default();
        assert_eq!(server.bind, "127.0.0.1:3001");
        assert!(server.db_path.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_storage_key() {
        let mut config = Config::default();
        config.local.storage_key = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("storage_key"));
    }

    #[test]
    fn test_validate_zero_quota() {
        let mut config = Config::default();
        config.local.max_value_bytes = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_value_bytes"));
    }

    #[test]
    fn test_validate_non_http_base_url() {
        let mut config = Config::default();
        config.remote.base_url = "ftp://example.com/notes".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("base_url"));
    }

    #[test]
    fn test_validate_zero_preview() {
        let mut config = Config::default();
        config.display.preview_chars = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("preview_chars"));
    }

    #[test]
    fn test_validate_bad_date_format() {
        let mut config = Config::default();
        config.display.date_format = "%d/%Q".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("date_format"));
    }

    #[test]
    fn test_validate_bad_bind_address() {
        let mut config = Config::default();
        config.server.bind = "localhost".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server.bind"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("notes.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.local.database_path = Some(PathBuf::from("/custom/path/notes.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/notes.sqlite")
        );
    }

    #[test]
    fn test_refetch_delay() {
        let mut config = Config::default();
        assert_eq!(config.refetch_delay(), Some(Duration::from_millis(300)));

        config.remote.refetch_delay_ms = 0;
        assert!(config.refetch_delay().is_none());
    }

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::Local.to_string(), "local");
        assert_eq!(BackendKind::Remote.to_string(), "remote");
    }

    #[test]
    fn test_backend_kind_deserialize() {
        let backend: BackendConfig = serde_json::from_str(r#"{"kind": "remote"}"#).unwrap();
        assert_eq!(backend.kind, BackendKind::Remote);
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("notekeeper"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "notekeeper_config_test_{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"
[backend]
kind = "remote"

[remote]
base_url = "http://10.0.0.2:9000/notes"
refetch_delay_ms = 0
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.backend.kind, BackendKind::Remote);
        assert_eq!(config.remote.base_url, "http://10.0.0.2:9000/notes");
        assert!(config.refetch_delay().is_none());
        // Untouched sections keep their defaults
        assert_eq!(config.local.storage_key, DEFAULT_STORAGE_KEY);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_display_config_deserialize() {
        let json = r#"{"preview_chars": 20}"#;
        let display: DisplayConfig = serde_json::from_str(json).unwrap();
        assert_eq!(display.preview_chars, 20);
        assert_eq!(display.date_format, "%d/%m/%Y");
    }
}
