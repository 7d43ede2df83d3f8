use crate::cli::{Cli, Commands};
use crate::config::Config;
use anyhow::Result;

use super::check::{check_link, print_extracted};
use super::run::run_relay;
use super::status::render_status;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => Ok(run_relay(&config).await?),
        Commands::Status => {
            println!("{}", render_status(&config));
            Ok(())
        }
        Commands::Check { url } => check_link(&config, &url).await,
        Commands::Extract { text } => {
            print_extracted(&text);
            Ok(())
        }
    }
}
