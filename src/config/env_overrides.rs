use super::types::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("DISCORD_TOKEN")
            && !token.trim().is_empty()
        {
            self.discord_token = token;
        }

        if let Ok(channel) = std::env::var("TARGET_CHANNEL_ID")
            && !channel.trim().is_empty()
        {
            self.target_channel_id = channel;
        }

        if let Ok(prefix) = std::env::var("COMMAND_PREFIX")
            && !prefix.is_empty()
        {
            self.command_prefix = prefix;
        }

        if let Ok(level) = std::env::var("LOG_LEVEL")
            && !level.is_empty()
        {
            self.log_level = level;
        }

        if let Ok(endpoint) = std::env::var("STEAM_APPDETAILS_URL")
            && !endpoint.is_empty()
        {
            self.validator.endpoint = endpoint;
        }

        if let Ok(raw) = std::env::var("VALIDATION_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.validator.timeout_secs = secs,
                Err(_) => self
                    .warnings
                    .push(format!("ignoring invalid VALIDATION_TIMEOUT_SECS {raw:?}")),
            }
        }

        if let Ok(raw) = std::env::var("STATUS_PORT") {
            match raw.trim().parse::<u16>() {
                Ok(port) => {
                    self.status.port = port;
                    self.status.enabled = true;
                }
                Err(_) => self
                    .warnings
                    .push(format!("ignoring invalid STATUS_PORT {raw:?}")),
            }
        }
    }
}
