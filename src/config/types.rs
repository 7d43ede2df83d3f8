use crate::links::DEFAULT_APPDETAILS_ENDPOINT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_COMMAND_PREFIX: &str = "!";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_VALIDATION_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File the config was read from, if any - not serialized
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
    /// Problems found while loading; replayed once logging is up
    #[serde(skip)]
    pub warnings: Vec<String>,

    pub discord_token: String,
    /// Channel that receives share reports.
    pub target_channel_id: String,
    pub command_prefix: String,
    pub log_level: String,

    pub validator: ValidatorConfig,
    pub discord: DiscordConfig,
    pub status: StatusConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            warnings: Vec::new(),
            discord_token: String::new(),
            target_channel_id: String::new(),
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            validator: ValidatorConfig::default(),
            discord: DiscordConfig::default(),
            status: StatusConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_APPDETAILS_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_VALIDATION_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub status: String,
    pub activity_name: Option<String>,
    /// Discord activity type; 3 renders as "Watching ...".
    pub activity_type: u8,
    pub intents: Option<u64>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            status: "online".to_string(),
            activity_name: Some("for Steam links".to_string()),
            activity_type: 3,
            intents: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}
