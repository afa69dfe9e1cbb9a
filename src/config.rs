//! Configuration system
//!
//! Layered configuration with runtime defaults, an optional TOML file, and
//! environment variable overrides. The two secrets (Slack bot token and
//! warehouse token) normally arrive through the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Slack delivery configuration
    pub slack: SlackConfig,

    /// Warehouse query configuration
    pub warehouse: WarehouseConfig,

    /// Paths configuration
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub token: String,
    pub channel_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    pub base_url: String,
    pub token: String,
    /// Trailing fetch window, in whole weeks.
    pub window_weeks: u32,
    /// Network identifiers the query is restricted to.
    pub networks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub log_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "INFO".to_string(),
                format: "pretty".to_string(),
                output: "console".to_string(),
            },
            slack: SlackConfig {
                token: String::new(),
                channel_id: String::new(),
            },
            warehouse: WarehouseConfig {
                base_url: String::new(),
                token: String::new(),
                window_weeks: 6,
                networks: vec!["Google Ads".to_string(), "Meta Ads".to_string()],
            },
            paths: PathsConfig {
                log_directory: PathBuf::from("logs"),
            },
        }
    }
}

impl Config {
    /// Load configuration from file, environment, and defaults.
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        let config_paths = [
            PathBuf::from("adpulse.toml"),
            PathBuf::from(".adpulse.toml"),
            dirs::config_dir()
                .map(|d| d.join("adpulse").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        // Slack overrides
        if let Ok(val) = env::var("SLACK_TOKEN") {
            self.slack.token = val;
        }
        if let Ok(val) = env::var("SLACK_CHANNEL_ID") {
            self.slack.channel_id = val;
        }

        // Warehouse overrides
        if let Ok(val) = env::var("ADPULSE_WAREHOUSE_URL") {
            self.warehouse.base_url = val;
        }
        if let Ok(val) = env::var("ADPULSE_WAREHOUSE_TOKEN") {
            self.warehouse.token = val;
        }
        if let Ok(val) = env::var("ADPULSE_WINDOW_WEEKS") {
            self.warehouse.window_weeks = val.parse().context("Invalid ADPULSE_WINDOW_WEEKS")?;
        }
        if let Ok(val) = env::var("ADPULSE_NETWORKS") {
            self.warehouse.networks = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Path overrides
        if let Ok(val) = env::var("ADPULSE_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.warehouse.window_weeks == 0 {
            return Err(anyhow::anyhow!("Warehouse window must be at least 1 week"));
        }

        if self.warehouse.networks.is_empty() {
            return Err(anyhow::anyhow!(
                "At least one network identifier must be configured"
            ));
        }

        if !self.paths.log_directory.exists() && self.logging.output != "console" {
            fs::create_dir_all(&self.paths.log_directory)
                .context("Failed to create log directory")?;
        }

        Ok(())
    }

    /// The settings delivery requires beyond what preview needs.
    pub fn require_delivery_settings(&self) -> Result<()> {
        if self.slack.token.is_empty() {
            return Err(anyhow::anyhow!("SLACK_TOKEN is not set"));
        }
        if self.slack.channel_id.is_empty() {
            return Err(anyhow::anyhow!("SLACK_CHANNEL_ID is not set"));
        }
        self.require_fetch_settings()
    }

    /// The settings any fetch requires.
    pub fn require_fetch_settings(&self) -> Result<()> {
        if self.warehouse.base_url.is_empty() {
            return Err(anyhow::anyhow!("ADPULSE_WAREHOUSE_URL is not set"));
        }
        if self.warehouse.token.is_empty() {
            return Err(anyhow::anyhow!("ADPULSE_WAREHOUSE_TOKEN is not set"));
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration instance
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| Config::load().expect("Failed to load configuration"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "INFO");
        assert_eq!(config.warehouse.window_weeks, 6);
        assert_eq!(
            config.warehouse.networks,
            vec!["Google Ads".to_string(), "Meta Ads".to_string()]
        );
    }

    #[test]
    fn test_env_override() {
        env::set_var("ADPULSE_WINDOW_WEEKS", "4");
        env::set_var("ADPULSE_NETWORKS", "TikTok Ads, Apple Search Ads");
        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.warehouse.window_weeks, 4);
        assert_eq!(
            config.warehouse.networks,
            vec!["TikTok Ads".to_string(), "Apple Search Ads".to_string()]
        );
        env::remove_var("ADPULSE_WINDOW_WEEKS");
        env::remove_var("ADPULSE_NETWORKS");
    }

    #[test]
    fn test_validation_rejects_zero_window() {
        let mut config = Config::default();
        config.warehouse.window_weeks = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_networks() {
        let mut config = Config::default();
        config.warehouse.networks.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_delivery_settings_required() {
        let config = Config::default();
        assert!(config.require_delivery_settings().is_err());

        let mut config = Config::default();
        config.slack.token = "xoxb-test".to_string();
        config.slack.channel_id = "C079KNDP8NM".to_string();
        config.warehouse.base_url = "https://warehouse.example.com".to_string();
        config.warehouse.token = "wh-test".to_string();
        assert!(config.require_delivery_settings().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adpulse.toml");
        fs::write(
            &path,
            r#"
[logging]
level = "DEBUG"
format = "json"
output = "console"

[slack]
token = "xoxb-file"
channel_id = "C000000"

[warehouse]
base_url = "https://warehouse.example.com"
token = "wh-file"
window_weeks = 8
networks = ["Google Ads"]

[paths]
log_directory = "logs"
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.logging.level, "DEBUG");
        assert_eq!(config.warehouse.window_weeks, 8);
        assert_eq!(config.slack.token, "xoxb-file");
    }
}
