//! Configuration management

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::errors::ConfigError;
use crate::application::services::SupervisorOptions;
use crate::domain::entities::{BrowserTag, ProtocolVersion};

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub reconnect: ReconnectConfig,
    pub moderation: ModerationConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    /// Directory holding the session credentials
    pub auth_dir: PathBuf,
    pub browser: BrowserTag,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ReconnectConfig {
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub drain_timeout_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ModerationConfig {
    /// Tell the chat when `kickall` fails instead of only logging
    pub notify_on_failure: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AdaptersConfig {
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConsoleConfig {
    pub protocol_version: ProtocolVersion,
    /// Groups the simulated service starts with: group address -> participant addresses
    pub groups: BTreeMap<String, Vec<String>>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "kickall-bot".to_string(),
            auth_dir: PathBuf::from("./auth_info"),
            browser: BrowserTag::default(),
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 1_000,
            max_backoff_ms: 60_000,
            drain_timeout_ms: 5_000,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            protocol_version: ProtocolVersion([2, 3000, 1015901307]),
            groups: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Environment overrides: `BOT_AUTH_DIR`, `BOT_NOTIFY_ON_KICK_FAILURE`
    pub fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("BOT_AUTH_DIR") {
            self.bot.auth_dir = PathBuf::from(dir);
        }

        if let Ok(flag) = std::env::var("BOT_NOTIFY_ON_KICK_FAILURE") {
            self.moderation.notify_on_failure = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.auth_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue("bot.auth-dir must not be empty".to_string()));
        }
        if self.reconnect.max_backoff_ms < self.reconnect.initial_backoff_ms {
            return Err(ConfigError::InvalidValue(
                "reconnect.max-backoff-ms must be at least reconnect.initial-backoff-ms".to_string(),
            ));
        }
        Ok(())
    }

    pub fn supervisor_options(&self) -> SupervisorOptions {
        SupervisorOptions {
            browser: self.bot.browser.clone(),
            initial_backoff: Duration::from_millis(self.reconnect.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.reconnect.max_backoff_ms),
            drain_timeout: Duration::from_millis(self.reconnect.drain_timeout_ms),
        }
    }
}
