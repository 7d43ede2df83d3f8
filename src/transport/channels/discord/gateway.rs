//! Discord gateway websocket: handshake, heartbeats, resume, and the two
//! dispatch events the relay consumes.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tokio_tungstenite::tungstenite::{self, Message};

use super::http_client::DiscordHttpClient;
use super::types::{DEFAULT_HEARTBEAT_INTERVAL_MS, GatewayOpcode};

const FALLBACK_GATEWAY_URL: &str = "wss://gateway.discord.gg";
const INVALID_SESSION_WAIT: Duration = Duration::from_secs(3);

/// Resume data that survives reconnects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeState {
    pub session_id: Option<String>,
    pub resume_url: Option<String>,
    pub sequence: Option<i64>,
}

/// Shared between successive gateway connections of one channel.
#[derive(Debug, Default)]
pub struct GatewaySession {
    state: Mutex<ResumeState>,
}

impl GatewaySession {
    fn lock(&self) -> MutexGuard<'_, ResumeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ResumeState {
        self.lock().clone()
    }

    fn observe_sequence(&self, sequence: i64) {
        self.lock().sequence = Some(sequence);
    }

    fn start(&self, session_id: &str, resume_url: &str) {
        let mut state = self.lock();
        state.session_id = Some(session_id.to_string());
        state.resume_url = Some(resume_url.to_string());
    }

    /// Drop the session; keep the resume URL only if Discord allows resuming.
    fn invalidate(&self, resumable: bool) {
        let mut state = self.lock();
        state.session_id = None;
        state.sequence = None;
        if !resumable {
            state.resume_url = None;
        }
    }
}

/// `MESSAGE_CREATE` payload fields the relay uses.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub message_id: String,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub author_id: String,
    pub author_is_bot: bool,
    /// Guild nickname, else global display name, else username.
    pub author_display_name: String,
    pub author_avatar: Option<String>,
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    MessageCreate(RawMessage),
    Ready {
        session_id: String,
        resume_gateway_url: String,
        user_id: String,
        username: String,
    },
}

#[derive(Debug, Deserialize)]
struct Frame {
    op: u8,
    #[serde(default)]
    s: Option<i64>,
    #[serde(default)]
    t: Option<String>,
    #[serde(default)]
    d: Value,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
    username: Option<String>,
    global_name: Option<String>,
    avatar: Option<String>,
    #[serde(default)]
    bot: bool,
}

#[derive(Debug, Deserialize)]
struct MemberData {
    nick: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReadyData {
    session_id: String,
    resume_gateway_url: String,
    user: UserData,
}

#[derive(Debug, Deserialize)]
struct MessageData {
    id: String,
    channel_id: String,
    guild_id: Option<String>,
    #[serde(default)]
    content: String,
    author: UserData,
    member: Option<MemberData>,
    timestamp: Option<DateTime<Utc>>,
}

impl From<MessageData> for RawMessage {
    fn from(data: MessageData) -> Self {
        let MessageData {
            id,
            channel_id,
            guild_id,
            content,
            author,
            member,
            timestamp,
        } = data;
        let author_display_name = member
            .and_then(|m| m.nick)
            .or(author.global_name)
            .or(author.username)
            .unwrap_or_else(|| author.id.clone());

        Self {
            message_id: id,
            channel_id,
            guild_id,
            author_id: author.id,
            author_is_bot: author.bot,
            author_display_name,
            author_avatar: author.avatar,
            content,
            timestamp,
        }
    }
}

/// What the read loop does after handling one frame.
enum Next {
    Continue,
    Reconnect,
}

/// Zombie-connection detection: a heartbeat may only go out once the
/// previous one was acknowledged.
struct Heartbeat {
    acked: bool,
}

impl Heartbeat {
    /// `false` when the last beat is still unacknowledged.
    fn due(&mut self) -> bool {
        std::mem::replace(&mut self.acked, false)
    }

    fn ack(&mut self) {
        self.acked = true;
    }
}

pub struct DiscordGateway {
    bot_token: String,
    intents: u64,
    session: Arc<GatewaySession>,
    presence: Option<Value>,
}

impl DiscordGateway {
    pub fn new(
        bot_token: String,
        intents: u64,
        session: Arc<GatewaySession>,
        presence: Option<Value>,
    ) -> Self {
        Self {
            bot_token,
            intents,
            session,
            presence,
        }
    }

    /// Run one websocket connection. `Ok(())` means the connection ended in a
    /// way that calls for reconnecting.
    pub async fn connect_and_listen(
        &self,
        http: &DiscordHttpClient,
        tx: &mpsc::Sender<GatewayEvent>,
    ) -> Result<()> {
        let base = match self.session.snapshot().resume_url {
            Some(url) if !url.is_empty() => url,
            _ => http
                .gateway_url()
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("Discord: gateway lookup failed ({e:#}); using default");
                    FALLBACK_GATEWAY_URL.to_string()
                }),
        };
        let ws_url = gateway_ws_url(&base);

        let (socket, _) = tokio_tungstenite::connect_async(&ws_url)
            .await
            .with_context(|| format!("connect Discord gateway websocket: {ws_url}"))?;
        let (mut write, mut read) = socket.split();

        let period = read_hello(&mut read).await?;
        self.send_handshake(&mut write).await?;

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut heartbeat = Heartbeat { acked: true };

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !heartbeat.due() {
                        tracing::warn!("Discord gateway heartbeat not acknowledged; reconnecting");
                        return Ok(());
                    }
                    self.send_heartbeat(&mut write).await?;
                }
                message = read.next() => {
                    let Some(message) = message else {
                        tracing::warn!("Discord gateway socket closed; reconnecting");
                        return Ok(());
                    };
                    let message = message.context("read Discord gateway message")?;
                    let Some(frame) = decode_frame(message)? else {
                        continue;
                    };
                    match self.handle_frame(frame, tx, &mut write, &mut heartbeat).await? {
                        Next::Continue => {}
                        Next::Reconnect => return Ok(()),
                    }
                }
            }
        }
    }

    async fn send_handshake<S>(&self, write: &mut S) -> Result<()>
    where
        S: Sink<Message, Error = tungstenite::Error> + Unpin,
    {
        let resume = self.session.snapshot();
        if let Some(session_id) = resume.session_id {
            tracing::debug!("Discord gateway resuming session");
            let data = json!({
                "token": self.bot_token,
                "session_id": session_id,
                "seq": resume.sequence,
            });
            return send_frame(write, GatewayOpcode::Resume, data).await;
        }

        let mut data = json!({
            "token": self.bot_token,
            "intents": self.intents,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "steam-link-relay",
                "device": "steam-link-relay"
            }
        });
        if let Some(presence) = &self.presence {
            data["presence"] = presence.clone();
        }
        send_frame(write, GatewayOpcode::Identify, data).await
    }

    async fn send_heartbeat<S>(&self, write: &mut S) -> Result<()>
    where
        S: Sink<Message, Error = tungstenite::Error> + Unpin,
    {
        let sequence = self.session.snapshot().sequence;
        send_frame(write, GatewayOpcode::Heartbeat, json!(sequence)).await
    }

    async fn handle_frame<S>(
        &self,
        frame: Frame,
        tx: &mpsc::Sender<GatewayEvent>,
        write: &mut S,
        heartbeat: &mut Heartbeat,
    ) -> Result<Next>
    where
        S: Sink<Message, Error = tungstenite::Error> + Unpin,
    {
        if let Some(sequence) = frame.s {
            self.session.observe_sequence(sequence);
        }

        match GatewayOpcode::from_u64(u64::from(frame.op)) {
            Some(GatewayOpcode::Dispatch) => {
                let event = frame
                    .t
                    .as_deref()
                    .and_then(|kind| parse_dispatch_event(kind, &frame.d));
                if let Some(event) = event {
                    if let GatewayEvent::Ready {
                        session_id,
                        resume_gateway_url,
                        ..
                    } = &event
                    {
                        self.session.start(session_id, resume_gateway_url);
                    }
                    tx.send(event)
                        .await
                        .context("forward Discord gateway event")?;
                }
                Ok(Next::Continue)
            }
            Some(GatewayOpcode::Heartbeat) => {
                self.send_heartbeat(write).await?;
                Ok(Next::Continue)
            }
            Some(GatewayOpcode::HeartbeatAck) => {
                heartbeat.ack();
                Ok(Next::Continue)
            }
            Some(GatewayOpcode::Reconnect) => {
                tracing::info!("Discord gateway requested reconnect");
                Ok(Next::Reconnect)
            }
            Some(GatewayOpcode::InvalidSession) => {
                let resumable = frame.d.as_bool().unwrap_or(false);
                tracing::warn!(resumable, "Discord gateway invalidated the session");
                self.session.invalidate(resumable);
                tokio::time::sleep(INVALID_SESSION_WAIT).await;
                Ok(Next::Reconnect)
            }
            _ => Ok(Next::Continue),
        }
    }
}

pub fn parse_dispatch_event(event_type: &str, d: &Value) -> Option<GatewayEvent> {
    match event_type {
        "READY" => {
            let ready = ReadyData::deserialize(d).ok()?;
            Some(GatewayEvent::Ready {
                session_id: ready.session_id,
                resume_gateway_url: ready.resume_gateway_url,
                username: ready.user.username.unwrap_or_else(|| "unknown".to_string()),
                user_id: ready.user.id,
            })
        }
        "MESSAGE_CREATE" => MessageData::deserialize(d)
            .ok()
            .map(|data| GatewayEvent::MessageCreate(data.into())),
        "RESUMED" => {
            tracing::info!("Discord gateway session resumed");
            None
        }
        _ => None,
    }
}

async fn send_frame<S>(write: &mut S, op: GatewayOpcode, d: Value) -> Result<()>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let payload = json!({ "op": op as u8, "d": d });
    write
        .send(Message::Text(payload.to_string().into()))
        .await
        .with_context(|| format!("send Discord gateway {op:?}"))
}

fn decode_frame(message: Message) -> Result<Option<Frame>> {
    let text = match message {
        Message::Text(text) => text.to_string(),
        Message::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
            Ok(text) => text,
            Err(_) => return Ok(None),
        },
        _ => return Ok(None),
    };
    serde_json::from_str(&text)
        .map(Some)
        .context("parse Discord gateway payload")
}

async fn read_hello<R>(read: &mut R) -> Result<Duration>
where
    R: Stream<Item = std::result::Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(message) = read.next().await {
        let message = message.context("read Discord gateway hello")?;
        let Some(frame) = decode_frame(message)? else {
            continue;
        };
        if frame.op == GatewayOpcode::Hello as u8 {
            let millis = frame
                .d
                .get("heartbeat_interval")
                .and_then(Value::as_u64)
                .unwrap_or(DEFAULT_HEARTBEAT_INTERVAL_MS);
            return Ok(Duration::from_millis(millis));
        }
    }
    anyhow::bail!("Discord gateway closed before Hello")
}

fn gateway_ws_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    format!("{trimmed}/?v=10&encoding=json")
}
