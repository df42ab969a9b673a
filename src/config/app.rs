//! Application configuration loaded from the environment.

use crate::config::database::get_database_url;
use crate::errors::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Base URL of the legacy REST backend.
pub const DEFAULT_LEGACY_API_URL: &str = "https://immense-river-40491.herokuapp.com";

/// Runtime settings for the binary and for anything embedding the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `SeaORM` connection string
    pub database_url: String,
    /// Optional TOML seed catalog replacing the built-in one
    pub seed_config_path: Option<PathBuf>,
    /// Base URL of the legacy REST backend
    pub legacy_api_url: String,
    /// Run "initialize all" as soon as the controller is mounted
    pub auto_initialize: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: super::database::DEFAULT_DATABASE_URL.to_string(),
            seed_config_path: None,
            legacy_api_url: DEFAULT_LEGACY_API_URL.to_string(),
            auto_initialize: false,
        }
    }
}

impl AppConfig {
    /// Reads `DATABASE_URL`, `SEED_CONFIG_PATH`, `LEGACY_API_URL` and
    /// `AUTO_INITIALIZE`, falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let auto_initialize = match std::env::var("AUTO_INITIALIZE") {
            Ok(raw) => parse_flag(&raw)?,
            Err(std::env::VarError::NotPresent) => false,
            Err(e) => return Err(e.into()),
        };

        let config = Self {
            database_url: get_database_url(),
            seed_config_path: std::env::var("SEED_CONFIG_PATH").ok().map(PathBuf::from),
            legacy_api_url: std::env::var("LEGACY_API_URL")
                .unwrap_or_else(|_| DEFAULT_LEGACY_API_URL.to_string()),
            auto_initialize,
        };
        info!(
            "Configuration loaded (seed file: {:?}, auto initialize: {})",
            config.seed_config_path, config.auto_initialize
        );
        Ok(config)
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::Config {
            message: format!("AUTO_INITIALIZE must be a boolean, got '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true").unwrap_or(false));
        assert!(parse_flag(" YES ").unwrap_or(false));
        assert!(!parse_flag("0").unwrap_or(true));
        assert!(!parse_flag("").unwrap_or(true));
        assert!(matches!(parse_flag("maybe"), Err(Error::Config { .. })));
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.database_url.starts_with("sqlite://"));
        assert_eq!(config.legacy_api_url, DEFAULT_LEGACY_API_URL);
        assert!(!config.auto_initialize);
        assert!(config.seed_config_path.is_none());
    }
}
