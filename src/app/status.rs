use crate::config::Config;

pub fn render_status(config: &Config) -> String {
    let token = if config.discord_token.trim().is_empty() {
        "missing"
    } else {
        "set"
    };
    let config_path = config
        .config_path
        .as_ref()
        .map_or_else(|| "(none)".to_string(), |path| path.display().to_string());
    let status_page = if config.status.enabled {
        format!("http://{}:{}", config.status.host, config.status.port)
    } else {
        "disabled".to_string()
    };

    [
        format!("steam-link-relay {}", env!("CARGO_PKG_VERSION")),
        String::new(),
        format!("Config file      {config_path}"),
        format!("Discord token    {token}"),
        format!(
            "Target channel   {}",
            config.target_channel().unwrap_or("(not set)")
        ),
        format!("Command prefix   {}", config.command_prefix),
        format!("Log level        {}", config.log_level),
        format!("Catalog          {}", config.validator.endpoint),
        format!("Catalog timeout  {}s", config.validator.timeout_secs),
        format!("Status page      {status_page}"),
    ]
    .join("\n")
}
