use super::types::{
    Config, DEFAULT_COMMAND_PREFIX, DEFAULT_LOG_LEVEL, DEFAULT_VALIDATION_TIMEOUT_SECS,
};
use crate::error::ConfigError;
use crate::links::DEFAULT_APPDETAILS_ENDPOINT;
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Level;

const CONFIG_DIR: &str = ".steam-link-relay";
const CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Defaults, then the config file, then `.env`, then the process
    /// environment. Bad values are repaired and noted in `warnings`.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match resolve_config_path(explicit_path)? {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Err(e) = dotenv::dotenv()
            && !e.not_found()
        {
            config.warnings.push(format!("ignoring unreadable .env file: {e}"));
        }

        config.apply_env_overrides();
        config.validate();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Repairs values the relay cannot run with, recording a warning for each.
    pub fn validate(&mut self) {
        if self.discord_token.trim().is_empty() {
            self.warnings
                .push("DISCORD_TOKEN is not set".to_string());
        }

        let target = self.target_channel_id.trim().to_string();
        if target.is_empty() {
            self.warnings
                .push("TARGET_CHANNEL_ID is not set; share reports will not be posted".to_string());
        } else if !target.chars().all(|c| c.is_ascii_digit()) {
            self.warnings.push(format!(
                "TARGET_CHANNEL_ID {target:?} is not a channel id; share reports will not be posted"
            ));
            self.target_channel_id.clear();
        } else {
            self.target_channel_id = target;
        }

        if self.command_prefix.trim().is_empty() {
            self.warnings.push(format!(
                "empty command prefix; using {DEFAULT_COMMAND_PREFIX:?}"
            ));
            self.command_prefix = DEFAULT_COMMAND_PREFIX.to_string();
        }

        if Level::from_str(self.log_level.trim()).is_err() {
            self.warnings.push(format!(
                "invalid log level {:?}; using {DEFAULT_LOG_LEVEL}",
                self.log_level
            ));
            self.log_level = DEFAULT_LOG_LEVEL.to_string();
        }

        if self.validator.timeout_secs == 0 {
            self.warnings.push(format!(
                "validation timeout must be positive; using {DEFAULT_VALIDATION_TIMEOUT_SECS}s"
            ));
            self.validator.timeout_secs = DEFAULT_VALIDATION_TIMEOUT_SECS;
        }

        if url::Url::parse(&self.validator.endpoint).is_err() {
            self.warnings.push(format!(
                "invalid catalog endpoint {:?}; using {DEFAULT_APPDETAILS_ENDPOINT}",
                self.validator.endpoint
            ));
            self.validator.endpoint = DEFAULT_APPDETAILS_ENDPOINT.to_string();
        }
    }

    /// The one hard requirement: without a bot token nothing can start.
    pub fn require_credential(&self) -> Result<&str, ConfigError> {
        let token = self.discord_token.trim();
        if token.is_empty() {
            return Err(ConfigError::MissingCredential("DISCORD_TOKEN"));
        }
        Ok(token)
    }

    pub fn target_channel(&self) -> Option<&str> {
        let target = self.target_channel_id.trim();
        (!target.is_empty()).then_some(target)
    }

    pub fn tracing_level(&self) -> Level {
        Level::from_str(self.log_level.trim()).unwrap_or(Level::INFO)
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit_path {
        if !path.exists() {
            return Err(ConfigError::Load(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    Ok(UserDirs::new()
        .map(|dirs| dirs.home_dir().join(CONFIG_DIR).join(CONFIG_FILE))
        .filter(|path| path.exists()))
}
