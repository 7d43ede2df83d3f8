mod env_overrides;
mod loader;
mod types;

pub use types::{
    Config, DEFAULT_COMMAND_PREFIX, DEFAULT_LOG_LEVEL, DEFAULT_VALIDATION_TIMEOUT_SECS,
    DiscordConfig, StatusConfig, ValidatorConfig,
};
