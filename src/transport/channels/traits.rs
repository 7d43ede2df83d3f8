use super::embed::Embed;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;

/// A chat message as seen by the relay.
///
/// `channel_id` is where the message was posted; `permalink` is a link
/// back to it when the platform has one.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub message_id: String,
    pub body: String,
    pub author_id: String,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
    pub author_is_bot: bool,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub permalink: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Core channel trait; implement for any messaging platform
pub trait Channel: Send + Sync {
    /// Human-readable channel name
    fn name(&self) -> &str;

    /// Send a plain text message to `channel_id`
    fn send<'a>(
        &'a self,
        message: &'a str,
        channel_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    /// Send a rich embed to `channel_id`
    fn send_embed<'a>(
        &'a self,
        embed: &'a Embed,
        channel_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    /// Start listening for incoming messages (long-running)
    fn listen<'a>(
        &'a self,
        tx: tokio::sync::mpsc::Sender<InboundMessage>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    /// User id the relay itself posts as, once known
    fn self_id(&self) -> Option<String> {
        None
    }
}
