#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;
use steam_link_relay::transport::channels::{Channel, Embed, InboundMessage};
use steam_link_relay::{LinkValidator, RelayController, RelaySettings, ShareLedger};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SOURCE_CHANNEL: &str = "100";
pub const TARGET_CHANNEL: &str = "200";
pub const BOT_ID: &str = "999";

#[derive(Debug, Clone)]
pub enum Sent {
    Text { channel: String, body: String },
    Embed { channel: String, embed: Embed },
}

/// In-memory channel that records everything sent through it.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<Sent>>,
    self_id: Option<String>,
    fail_sends: bool,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self {
            self_id: Some(BOT_ID.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn embeds_to(&self, channel_id: &str) -> Vec<Embed> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Embed { channel, embed } if channel == channel_id => Some(embed),
                _ => None,
            })
            .collect()
    }

    pub fn texts_to(&self, channel_id: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Text { channel, body } if channel == channel_id => Some(body),
                _ => None,
            })
            .collect()
    }

    fn push(&self, sent: Sent) -> anyhow::Result<()> {
        if self.fail_sends {
            anyhow::bail!("403 Missing Access");
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    fn send<'a>(
        &'a self,
        message: &'a str,
        channel_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.push(Sent::Text {
                channel: channel_id.to_string(),
                body: message.to_string(),
            })
        })
    }

    fn send_embed<'a>(
        &'a self,
        embed: &'a Embed,
        channel_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.push(Sent::Embed {
                channel: channel_id.to_string(),
                embed: embed.clone(),
            })
        })
    }

    fn listen<'a>(
        &'a self,
        _tx: tokio::sync::mpsc::Sender<InboundMessage>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { Ok(()) })
    }

    fn self_id(&self) -> Option<String> {
        self.self_id.clone()
    }
}

/// Catalog stub: `listed` apps answer `success: true`, `unlisted` answer
/// `success: false`.
pub async fn catalog(listed: &[&str], unlisted: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    for (ids, success) in [(listed, true), (unlisted, false)] {
        for id in ids {
            let mut body = serde_json::Map::new();
            body.insert((*id).to_string(), json!({ "success": success }));
            Mock::given(method("GET"))
                .and(path("/api/appdetails"))
                .and(query_param("appids", *id))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(&server)
                .await;
        }
    }
    server
}

pub struct Harness {
    pub channel: Arc<RecordingChannel>,
    pub ledger: Arc<ShareLedger>,
    pub controller: Arc<RelayController>,
}

impl Harness {
    pub fn new(server: &MockServer, channel: RecordingChannel, settings: RelaySettings) -> Self {
        let channel = Arc::new(channel);
        let ledger = Arc::new(ShareLedger::new());
        let validator = LinkValidator::new(
            &format!("{}/api/appdetails", server.uri()),
            Duration::from_secs(2),
        )
        .unwrap();
        let controller = Arc::new(RelayController::new(
            Arc::clone(&channel) as Arc<dyn Channel>,
            Arc::new(validator),
            Arc::clone(&ledger),
            settings,
        ));
        Self {
            channel,
            ledger,
            controller,
        }
    }

    pub fn with_target(server: &MockServer) -> Self {
        Self::new(server, RecordingChannel::new(), target_settings())
    }

    /// Wait until the channel has recorded `count` sends, or panic after `limit`.
    pub async fn wait_for_sends(&self, count: usize, limit: Duration) -> Vec<Sent> {
        let deadline = tokio::time::Instant::now() + limit;
        loop {
            let sent = self.channel.sent();
            if sent.len() >= count {
                return sent;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "expected {count} sends, saw {}",
                sent.len()
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

pub fn target_settings() -> RelaySettings {
    RelaySettings {
        target_channel_id: Some(TARGET_CHANNEL.to_string()),
        ..RelaySettings::default()
    }
}

pub fn message(author_id: &str, body: &str) -> InboundMessage {
    InboundMessage {
        message_id: "555".into(),
        body: body.into(),
        author_id: author_id.into(),
        author_name: format!("user-{author_id}"),
        author_avatar_url: None,
        author_is_bot: false,
        channel_id: SOURCE_CHANNEL.into(),
        guild_id: Some("1".into()),
        permalink: Some(format!(
            "https://discord.com/channels/1/{SOURCE_CHANNEL}/555"
        )),
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}
