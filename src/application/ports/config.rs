//! Configuration port interface

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::warn;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Port for the persisted settings file
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load configuration from storage.
    ///
    /// # Returns
    /// The loaded config (all fields None if the file doesn't exist)
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Save configuration to storage.
    ///
    /// # Arguments
    /// * `config` - The configuration to save
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Get the configuration file path.
    fn path(&self) -> PathBuf;

    /// Check if configuration file exists.
    fn exists(&self) -> bool;

    /// Initialize configuration file with defaults.
    /// Fails if file already exists.
    async fn init(&self) -> Result<(), ConfigError>;

    /// Resolve the effective config: defaults < file < `overrides`.
    /// An unreadable file is logged and skipped.
    async fn load_layered(&self, overrides: AppConfig) -> AppConfig {
        let file_config = match self.load().await {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %self.path().display(), error = %e, "ignoring unreadable config file");
                AppConfig::empty()
            }
        };

        AppConfig::defaults().merge(file_config).merge(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::DEFAULT_API_URL;

    struct MemoryStore {
        content: Result<AppConfig, ConfigError>,
    }

    #[async_trait]
    impl ConfigStore for MemoryStore {
        async fn load(&self) -> Result<AppConfig, ConfigError> {
            self.content.clone()
        }

        async fn save(&self, _config: &AppConfig) -> Result<(), ConfigError> {
            Ok(())
        }

        fn path(&self) -> PathBuf {
            PathBuf::from("/memory/config.toml")
        }

        fn exists(&self) -> bool {
            self.content.is_ok()
        }

        async fn init(&self) -> Result<(), ConfigError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn overrides_beat_file_and_defaults() {
        let store = MemoryStore {
            content: Ok(AppConfig {
                api_url: Some("http://file:5001".to_string()),
                ..Default::default()
            }),
        };

        let config = store.load_layered(AppConfig::empty()).await;
        assert_eq!(config.api_url_or_default(), "http://file:5001");
        assert_eq!(config.ready_timeout().unwrap().as_secs(), 5);

        let config = store
            .load_layered(AppConfig {
                api_url: Some("http://flag:5001".to_string()),
                ..Default::default()
            })
            .await;
        assert_eq!(config.api_url_or_default(), "http://flag:5001");
    }

    #[tokio::test]
    async fn unreadable_file_falls_back_to_defaults() {
        let store = MemoryStore {
            content: Err(ConfigError::ParseError("bad toml".to_string())),
        };

        let config = store.load_layered(AppConfig::empty()).await;
        assert_eq!(config, AppConfig::defaults());
        assert_eq!(config.api_url_or_default(), DEFAULT_API_URL);
    }
}
