use thiserror::Error;

/// Top-level error type for the `scoutly-api` crate.
///
/// Covers every failure mode across both API surfaces: authentication,
/// transport, the REST API, and the push channel. `scoutly-core` maps
/// these into domain-level diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Session token has expired or was revoked.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    /// An endpoint requiring auth was called before `authenticate()`.
    #[error("Not authenticated -- call authenticate() first")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── REST API ────────────────────────────────────────────────────
    /// Structured error response from the API.
    #[error("Scout API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Push channel ────────────────────────────────────────────────
    /// WebSocket connection failed.
    #[error("Push channel connection failed: {0}")]
    ChannelConnect(String),

    /// WebSocket closed unexpectedly.
    #[error("Push channel closed (code {code}): {reason}")]
    ChannelClosed { code: u16, reason: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::SessionExpired | Self::NotAuthenticated | Self::Api { status: 401, .. }
        )
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::ChannelConnect(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }
}
