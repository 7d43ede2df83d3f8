#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use steam_link_relay::Config;
use steam_link_relay::app::dispatch::dispatch;
use steam_link_relay::cli::Cli;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Both gateway TLS and reqwest go through rustls; pin the ring provider.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.tracing_level())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    for warning in &config.warnings {
        tracing::warn!("{warning}");
    }

    dispatch(cli, config).await
}
