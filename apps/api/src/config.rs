//! Command layer configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use renthub_core::MAX_LISTING_IMAGES;
use renthub_db::DbConfig;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size (default: 5)
    pub db_max_connections: u32,

    /// Prefix every image reference must carry (default: `/uploads`)
    pub upload_prefix: String,

    /// Images accepted per listing (default: 5)
    pub max_images: usize,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `RENTHUB_DB_PATH` | `<platform data dir>/renthub.db` |
    /// | `RENTHUB_DB_MAX_CONNECTIONS` | `5` |
    /// | `RENTHUB_UPLOAD_PREFIX` | `/uploads` |
    /// | `RENTHUB_MAX_IMAGES` | `5` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let db_path = match env::var("RENTHUB_DB_PATH") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_db_path()?,
        };

        let config = AppConfig {
            db_path,

            db_max_connections: env::var("RENTHUB_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RENTHUB_DB_MAX_CONNECTIONS".to_string()))?,

            upload_prefix: env::var("RENTHUB_UPLOAD_PREFIX")
                .unwrap_or_else(|_| "/uploads".to_string()),

            max_images: env::var("RENTHUB_MAX_IMAGES")
                .unwrap_or_else(|_| MAX_LISTING_IMAGES.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RENTHUB_MAX_IMAGES".to_string()))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects values that parse but make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("RENTHUB_DB_MAX_CONNECTIONS".to_string()));
        }
        if self.max_images == 0 || self.max_images > MAX_LISTING_IMAGES {
            return Err(ConfigError::InvalidValue("RENTHUB_MAX_IMAGES".to_string()));
        }
        if !self.upload_prefix.starts_with('/') {
            return Err(ConfigError::InvalidValue("RENTHUB_UPLOAD_PREFIX".to_string()));
        }
        Ok(())
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.db_path.clone()).max_connections(self.db_max_connections)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: PathBuf::from("renthub.db"),
            db_max_connections: 5,
            upload_prefix: "/uploads".to_string(),
            max_images: MAX_LISTING_IMAGES,
        }
    }
}

/// Platform data directory, created on first use.
///
/// - **macOS**: `~/Library/Application Support/com.renthub.renthub/renthub.db`
/// - **Windows**: `%APPDATA%\renthub\renthub\data\renthub.db`
/// - **Linux**: `~/.local/share/renthub/renthub.db`
fn default_db_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("com", "renthub", "renthub")
        .ok_or_else(|| ConfigError::MissingRequired("RENTHUB_DB_PATH".to_string()))?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {}", data_dir.display(), e)))?;

    Ok(data_dir.join("renthub.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Cannot create data directory {0}")]
    DataDir(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nonsense() {
        let zero_pool = AppConfig {
            db_max_connections: 0,
            ..AppConfig::default()
        };
        assert!(matches!(zero_pool.validate(), Err(ConfigError::InvalidValue(v)) if v == "RENTHUB_DB_MAX_CONNECTIONS"));

        let too_many_images = AppConfig {
            max_images: MAX_LISTING_IMAGES + 1,
            ..AppConfig::default()
        };
        assert!(too_many_images.validate().is_err());

        let relative_prefix = AppConfig {
            upload_prefix: "uploads".to_string(),
            ..AppConfig::default()
        };
        assert!(relative_prefix.validate().is_err());
    }

    #[test]
    fn test_db_config_carries_pool_size() {
        let config = AppConfig {
            db_max_connections: 9,
            ..AppConfig::default()
        };
        let db = config.db_config();
        assert_eq!(db.database_path, PathBuf::from("renthub.db"));
        assert_eq!(db.max_connections, 9);
    }
}
