use std::time::Duration;
use std::{fs, path::PathBuf};

use common::prelude::VaultConfig;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "vanish";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the HTTP server (UI + API combined)
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Public URL share links are built on,
    ///  defaults to http://localhost:<listen_port>
    #[serde(default)]
    pub base_url: Option<String>,
    /// Lifetime of a secret that is not burned on read
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
    /// Safety-net lifetime of a burn-after-read secret
    #[serde(default = "default_destructive_ttl_secs")]
    pub destructive_ttl_secs: u64,
    /// Largest note plus attachment accepted
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// How often expired rows are swept out of the database
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
    /// Deadline for each individual store call
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,
}

fn default_listen_port() -> u16 {
    3000
}

fn default_ttl_secs() -> u64 {
    60 * 60 * 24
}

fn default_destructive_ttl_secs() -> u64 {
    60 * 60 * 24 * 365
}

fn default_max_upload_bytes() -> usize {
    10 << 20
}

fn default_purge_interval_secs() -> u64 {
    60
}

fn default_operation_timeout_secs() -> u64 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            base_url: None,
            default_ttl_secs: default_ttl_secs(),
            destructive_ttl_secs: default_destructive_ttl_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            purge_interval_secs: default_purge_interval_secs(),
            operation_timeout_secs: default_operation_timeout_secs(),
        }
    }
}

impl AppConfig {
    pub fn vault_config(&self) -> VaultConfig {
        VaultConfig {
            default_ttl: Duration::from_secs(self.default_ttl_secs),
            destructive_ttl: Duration::from_secs(self.destructive_ttl_secs),
            operation_timeout: Duration::from_secs(self.operation_timeout_secs),
            max_secret_bytes: Some(self.max_upload_bytes),
        }
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs.max(1))
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the vanish directory (~/.vanish)
    pub vanish_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the vanish directory path (custom or default ~/.vanish)
    pub fn vanish_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new vanish state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let vanish_dir = Self::vanish_dir(custom_path)?;

        if vanish_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&vanish_dir)?;

        let config = config.unwrap_or_default();
        let config_path = vanish_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        // the store creates and migrates the database on first start
        let db_path = vanish_dir.join(DB_FILE_NAME);

        Ok(Self {
            vanish_dir,
            db_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the vanish directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let vanish_dir = Self::vanish_dir(custom_path)?;

        if !vanish_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let db_path = vanish_dir.join(DB_FILE_NAME);
        let config_path = vanish_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            vanish_dir,
            db_path,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("vanish directory not initialized. Run 'vanish init' first")]
    NotInitialized,

    #[error("vanish directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_load() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("vanish");

        let config = AppConfig {
            listen_port: 4000,
            base_url: Some("https://vanish.example.com".to_string()),
            ..AppConfig::default()
        };
        let created = AppState::init(Some(dir.clone()), Some(config.clone())).unwrap();
        assert_eq!(created.config, config);

        let loaded = AppState::load(Some(dir.clone())).unwrap();
        assert_eq!(loaded.config, config);
        assert_eq!(loaded.db_path, dir.join(DB_FILE_NAME));

        assert!(matches!(
            AppState::init(Some(dir), None),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_load_missing_dir() {
        let temp = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppState::load(Some(temp.path().join("nope"))),
            Err(StateError::NotInitialized)
        ));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("listen_port = 8081\n").unwrap();
        assert_eq!(config.listen_port, 8081);
        assert_eq!(config.default_ttl_secs, 86_400);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_vault_config() {
        let vault = AppConfig::default().vault_config();
        assert_eq!(vault.default_ttl, Duration::from_secs(86_400));
        assert_eq!(vault.destructive_ttl, Duration::from_secs(86_400 * 365));
        assert_eq!(vault.max_secret_bytes, Some(10 << 20));
    }
}
