use crate::config::Config;
use crate::error::Result;
use crate::ledger::ShareLedger;
use crate::links::LinkValidator;
use crate::relay::{RelayController, RelaySettings};
use crate::transport::channels::runtime::{
    DEFAULT_CHANNEL_INITIAL_BACKOFF_SECS, DEFAULT_CHANNEL_MAX_BACKOFF_SECS,
    spawn_supervised_listener,
};
use crate::transport::channels::{Channel, DiscordChannel, InboundMessage};
use crate::transport::status::run_status_server;
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

const INBOUND_BUFFER: usize = 100;

/// Connect to Discord and relay until Ctrl-C.
pub async fn run_relay(config: &Config) -> Result<()> {
    let token = config.require_credential()?;
    let discord = Arc::new(DiscordChannel::new(token, config.discord.clone()));
    let settings = RelaySettings::from_config(config);

    match settings.target_channel_id.as_deref() {
        Some(id) => match discord.channel_name(id).await {
            Some(name) => info!("Relaying Steam links to #{name} ({id})"),
            None => warn!("Target channel {id} could not be resolved; reports may fail"),
        },
        None => warn!("TARGET_CHANNEL_ID is not set; shares will be counted but not relayed"),
    }

    let validator =
        Arc::new(LinkValidator::from_config(&config.validator).context("build link validator")?);
    info!("Validating links against {}", validator.endpoint());

    let ledger = Arc::new(ShareLedger::new());
    let channel: Arc<dyn Channel> = discord;
    let controller = Arc::new(RelayController::new(
        Arc::clone(&channel),
        validator,
        Arc::clone(&ledger),
        settings,
    ));

    let status_handle = config.status.enabled.then(|| {
        let host = config.status.host.clone();
        let port = config.status.port;
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move {
            if let Err(e) = run_status_server(&host, port, ledger).await {
                error!("Status page stopped: {e:#}");
            }
        })
    });

    let (tx, rx) = mpsc::channel(INBOUND_BUFFER);
    let listener = spawn_supervised_listener(
        channel,
        tx,
        DEFAULT_CHANNEL_INITIAL_BACKOFF_SECS,
        DEFAULT_CHANNEL_MAX_BACKOFF_SECS,
    );

    tokio::select! {
        () = relay_loop(rx, controller) => warn!("Inbound message stream closed"),
        result = tokio::signal::ctrl_c() => {
            result.context("listen for shutdown signal")?;
            info!("Shutting down");
        }
    }

    listener.abort();
    if let Some(handle) = status_handle {
        handle.abort();
    }
    info!(
        total_shares = ledger.total_shares(),
        tracked_games = ledger.len(),
        "Relay stopped; counts are not persisted"
    );
    Ok(())
}

/// Hand each message to its own task so a slow catalog lookup never
/// delays other messages or commands.
pub async fn relay_loop(
    mut rx: mpsc::Receiver<InboundMessage>,
    controller: Arc<RelayController>,
) {
    while let Some(message) = rx.recv().await {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move {
            controller.handle_message(&message).await;
        });
    }
}
