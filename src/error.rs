use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for the relay.
///
/// Startup and wiring code returns these so callers can tell a missing
/// credential apart from a broken transport; internal plumbing keeps using
/// `anyhow::Result` for context chains.
#[derive(Debug, Error)]
pub enum RelayError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Transport / Channel ─────────────────────────────────────────────
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    // ── Catalog validation ──────────────────────────────────────────────
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Transport errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("channel {channel} send failed: {message}")]
    Send { channel: String, message: String },

    #[error("gateway: {0}")]
    Gateway(String),
}

// ─── Validation errors ──────────────────────────────────────────────────────

/// Failures of the remote catalog lookup. None of these reject a link on
/// their own; see [`crate::links::Validation`].
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("catalog request failed: {0}")]
    Transport(String),

    #[error("catalog request timed out after {0}s")]
    Timeout(u64),

    #[error("catalog response body unreadable: {0}")]
    Body(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, RelayError>;
