//! Configuration management
//!
//! Loaded once at startup and passed around by reference; handlers never
//! reach for ambient globals.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub plugins: PluginConfig,
    pub storage: StorageConfig,
    pub datasource: DataSourceConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    /// The bot's own account id
    pub account: u64,
    pub prefix: String,
    /// Operator account; unset means administrative commands are open
    pub master: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginConfig {
    pub directory: PathBuf,
    pub auto_load: bool,
    /// Namespace of the hot-reloadable custom command package
    pub custom_package: Option<String>,
    /// Delay between unload and reload of the custom package
    #[serde(default = "default_reload_settle_ms")]
    pub reload_settle_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    pub database: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DataSourceConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub mirai: Option<MiraiConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MiraiConfig {
    pub enabled: bool,
    pub base_url: String,
    pub verify_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
}

fn default_reload_settle_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "lantern-bot".to_string(),
                account: 0,
                prefix: "/".to_string(),
                master: None,
            },
            plugins: PluginConfig {
                directory: PathBuf::from("./plugins"),
                auto_load: true,
                custom_package: None,
                reload_settle_ms: default_reload_settle_ms(),
            },
            storage: StorageConfig {
                database: PathBuf::from("lantern-bot.db"),
            },
            datasource: DataSourceConfig {
                path: PathBuf::from("subscriptions.json"),
            },
            adapters: AdaptersConfig {
                mirai: Some(MiraiConfig {
                    enabled: false,
                    base_url: "http://localhost:8080".to_string(),
                    verify_key: None,
                }),
                console: Some(ConsoleConfig { enabled: true }),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Defaults overridden by environment variables
    pub fn load_env() -> Self {
        let mut config = Config::default();

        if let Ok(account) = std::env::var("BOT_ACCOUNT") {
            if let Ok(account) = account.parse() {
                config.bot.account = account;
            }
        }

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            config.bot.prefix = prefix;
        }

        if let Ok(master) = std::env::var("BOT_MASTER") {
            config.bot.master = master.parse().ok();
        }

        if let Ok(base_url) = std::env::var("MIRAI_BASE_URL") {
            if let Some(ref mut mirai) = config.adapters.mirai {
                mirai.base_url = base_url;
                mirai.enabled = true;
            }
        }

        if let Ok(key) = std::env::var("MIRAI_VERIFY_KEY") {
            if let Some(ref mut mirai) = config.adapters.mirai {
                mirai.verify_key = Some(key);
            }
        }

        config
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
