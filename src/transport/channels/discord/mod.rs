pub mod gateway;
pub mod http_client;
pub mod types;

use crate::config::DiscordConfig;
use crate::error::TransportError;
use crate::transport::channels::embed::Embed;
use crate::transport::channels::traits::{Channel, InboundMessage};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use self::gateway::{DiscordGateway, GatewayEvent, GatewaySession, RawMessage};
use self::http_client::DiscordHttpClient;
use self::types::{DEFAULT_INTENTS, MAX_MESSAGE_LENGTH, avatar_url, message_permalink};

pub struct DiscordChannel {
    http: DiscordHttpClient,
    bot_token: String,
    gateway_session: Arc<GatewaySession>,
    config: DiscordConfig,
    bot_user_id: std::sync::Mutex<Option<String>>,
}

impl DiscordChannel {
    pub fn new(bot_token: impl Into<String>, config: DiscordConfig) -> Self {
        let bot_token = bot_token.into();
        Self {
            http: DiscordHttpClient::new(&bot_token),
            bot_token,
            gateway_session: Arc::new(GatewaySession::default()),
            config,
            bot_user_id: std::sync::Mutex::new(None),
        }
    }

    fn intents(&self) -> u64 {
        self.config.intents.unwrap_or(DEFAULT_INTENTS)
    }

    fn build_presence(&self) -> Option<serde_json::Value> {
        let activity_name = self.config.activity_name.as_deref()?;

        Some(serde_json::json!({
            "status": self.config.status,
            "activities": [{
                "name": activity_name,
                "type": self.config.activity_type,
            }],
            "since": null,
            "afk": false,
        }))
    }

    fn set_bot_user_id(&self, user_id: &str) {
        if let Ok(mut guard) = self.bot_user_id.lock() {
            *guard = Some(user_id.to_string());
        }
    }

    /// Channel name for logs, `None` if it cannot be fetched.
    pub async fn channel_name(&self, channel_id: &str) -> Option<String> {
        match self.http.get_channel(channel_id).await {
            Ok(channel) => channel.name,
            Err(e) => {
                tracing::debug!("Discord: could not fetch channel {channel_id}: {e:#}");
                None
            }
        }
    }

    fn to_inbound(raw: RawMessage) -> InboundMessage {
        let permalink =
            message_permalink(raw.guild_id.as_deref(), &raw.channel_id, &raw.message_id);
        let author_avatar_url = raw
            .author_avatar
            .as_deref()
            .map(|hash| avatar_url(&raw.author_id, hash));

        InboundMessage {
            message_id: raw.message_id,
            body: raw.content,
            author_id: raw.author_id,
            author_name: raw.author_display_name,
            author_avatar_url,
            author_is_bot: raw.author_is_bot,
            channel_id: raw.channel_id,
            guild_id: raw.guild_id,
            permalink: Some(permalink),
            timestamp: raw.timestamp.unwrap_or_else(chrono::Utc::now),
        }
    }

    async fn handle_gateway_event(
        &self,
        event: GatewayEvent,
        tx: &tokio::sync::mpsc::Sender<InboundMessage>,
    ) {
        match event {
            GatewayEvent::Ready {
                user_id, username, ..
            } => {
                self.set_bot_user_id(&user_id);
                tracing::info!("Discord: logged in as {username} ({user_id})");
            }
            GatewayEvent::MessageCreate(raw) => {
                if raw.content.is_empty() {
                    return;
                }
                if tx.send(Self::to_inbound(raw)).await.is_err() {
                    tracing::warn!("Discord: inbound message receiver dropped");
                }
            }
        }
    }
}

fn send_error(error: &anyhow::Error) -> anyhow::Error {
    TransportError::Send {
        channel: "discord".to_string(),
        message: format!("{error:#}"),
    }
    .into()
}

impl Channel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    fn send<'a>(
        &'a self,
        message: &'a str,
        channel_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let truncated: String = message.chars().take(MAX_MESSAGE_LENGTH).collect();
            self.http
                .send_message(channel_id, &truncated)
                .await
                .map_err(|e| send_error(&e))
        })
    }

    fn send_embed<'a>(
        &'a self,
        embed: &'a Embed,
        channel_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.http
                .send_embed(channel_id, embed)
                .await
                .map_err(|e| send_error(&e))
        })
    }

    fn listen<'a>(
        &'a self,
        tx: tokio::sync::mpsc::Sender<InboundMessage>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let gateway = DiscordGateway::new(
                self.bot_token.clone(),
                self.intents(),
                Arc::clone(&self.gateway_session),
                self.build_presence(),
            );

            let (event_tx, mut event_rx) = tokio::sync::mpsc::channel::<GatewayEvent>(100);

            let mut gateway_handle = {
                let http = DiscordHttpClient::new(&self.bot_token);
                tokio::spawn(async move { gateway.connect_and_listen(&http, &event_tx).await })
            };

            loop {
                tokio::select! {
                    event = event_rx.recv() => {
                        let Some(event) = event else {
                            break;
                        };
                        self.handle_gateway_event(event, &tx).await;
                    }
                    result = &mut gateway_handle => {
                        match result {
                            Ok(Ok(())) => {}
                            Ok(Err(e)) => return Err(e),
                            Err(e) => {
                                let panic = TransportError::Gateway(format!("task panicked: {e}"));
                                return Err(panic.into());
                            }
                        }
                        break;
                    }
                }
            }

            Ok(())
        })
    }

    fn self_id(&self) -> Option<String> {
        self.bot_user_id
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}
