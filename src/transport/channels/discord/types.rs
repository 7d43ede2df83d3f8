//! Discord API constants and type definitions.

/// Discord API base URL (v10).
pub const API_BASE: &str = "https://discord.com/api/v10";

/// Discord CDN base URL, used for avatars.
pub const CDN_BASE: &str = "https://cdn.discordapp.com";

/// Base for message permalinks.
pub const WEB_BASE: &str = "https://discord.com";

/// Default Gateway intents bitmask.
///
/// GUILDS (1) | `GUILD_MESSAGES` (512) | `DIRECT_MESSAGES` (4096)
/// | `MESSAGE_CONTENT` (32768) = 37377
pub const DEFAULT_INTENTS: u64 = 37377;

/// Default heartbeat interval when server does not provide one (ms).
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 41250;

/// Discord maximum message length (characters).
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Gateway opcodes used in the Discord WebSocket protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GatewayOpcode {
    /// An event was dispatched (server → client).
    Dispatch = 0,
    /// Fired periodically to keep the connection alive.
    Heartbeat = 1,
    /// Starts a new session during the initial handshake.
    Identify = 2,
    /// Resume a previous session that was disconnected.
    Resume = 6,
    /// Server is telling the client to reconnect.
    Reconnect = 7,
    /// The session has been invalidated.
    InvalidSession = 9,
    /// Sent immediately after connecting; contains heartbeat interval.
    Hello = 10,
    /// Acknowledges a received heartbeat.
    HeartbeatAck = 11,
}

impl GatewayOpcode {
    /// Convert a raw u64 value to an opcode, if it is one the relay handles.
    pub fn from_u64(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Dispatch),
            1 => Some(Self::Heartbeat),
            2 => Some(Self::Identify),
            6 => Some(Self::Resume),
            7 => Some(Self::Reconnect),
            9 => Some(Self::InvalidSession),
            10 => Some(Self::Hello),
            11 => Some(Self::HeartbeatAck),
            _ => None,
        }
    }
}

/// Individual intent bit flags.
pub mod intents {
    pub const GUILDS: u64 = 1 << 0;
    pub const GUILD_MESSAGES: u64 = 1 << 9;
    pub const DIRECT_MESSAGES: u64 = 1 << 12;
    pub const MESSAGE_CONTENT: u64 = 1 << 15;
}

/// Permalink for a message; direct messages use `@me` in place of a guild.
pub fn message_permalink(guild_id: Option<&str>, channel_id: &str, message_id: &str) -> String {
    let guild = guild_id.unwrap_or("@me");
    format!("{WEB_BASE}/channels/{guild}/{channel_id}/{message_id}")
}

/// CDN URL for a user's avatar hash; animated hashes (`a_`) get `.gif`.
pub fn avatar_url(user_id: &str, avatar_hash: &str) -> String {
    let ext = if avatar_hash.starts_with("a_") {
        "gif"
    } else {
        "png"
    };
    format!("{CDN_BASE}/avatars/{user_id}/{avatar_hash}.{ext}")
}
