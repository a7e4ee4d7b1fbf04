use std::env;
use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::types::DashboardError;

use super::{paths, Config};

pub const API_URL_ENV: &str = "DASHBOARD_API_URL";

impl Config {
    /// Load configuration from an explicit path, or dashboard.json next to the install root.
    /// Falls back to defaults if the file doesn't exist or can't be parsed
    pub async fn load(explicit: Option<&Path>) -> Self {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => paths::get_config_path(),
        };

        let mut config = match Self::try_load(&config_path).await {
            Ok(config) => config,
            Err(err) => {
                warn!(error = ?err, "Failed to load config, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();

        info!(
            api_url = %config.api_url,
            poll_interval_ms = config.poll_interval_ms,
            wait_secs = config.wait_secs,
            "Loaded configuration"
        );
        config
    }

    pub async fn try_load(config_path: &Path) -> Result<Self, DashboardError> {
        if !config_path.exists() {
            warn!(path = %config_path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(config_path)
            .await
            .map_err(|err| DashboardError::Config(format!("Failed to read config file: {err}")))?;

        serde_json::from_str(&contents).map_err(|err| {
            DashboardError::Config(format!(
                "Failed to parse {}: {err}",
                config_path.display()
            ))
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(custom) = env::var(API_URL_ENV) {
            let trimmed = custom.trim();
            if !trimmed.is_empty() {
                self.api_url = trimmed.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::try_load(&dir.path().join("absent.json"))
            .await
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn partial_file_keeps_defaults_for_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"api_url": "http://dash:3000", "poll_interval_ms": 250, "trigger": "cat"}}"#
        )
        .unwrap();

        let config = Config::try_load(file.path()).await.unwrap();
        assert_eq!(config.api_url, "http://dash:3000");
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.trigger.as_deref(), Some("cat"));
        assert_eq!(config.backoff_multiplier, 5);
        assert_eq!(config.wait_secs, 55);
    }

    #[tokio::test]
    async fn env_var_overrides_api_url_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_url": "http://from-file:3000"}}"#).unwrap();

        env::set_var(API_URL_ENV, "  http://from-env:4000 ");
        let config = Config::load(Some(file.path())).await;
        env::remove_var(API_URL_ENV);

        assert_eq!(config.api_url, "http://from-env:4000");
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[tokio::test]
    async fn invalid_json_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let err = Config::try_load(file.path()).await.unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }
}
