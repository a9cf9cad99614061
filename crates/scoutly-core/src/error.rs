// ── Core error types ──
//
// User-facing errors from scoutly-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<scoutly_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to Scout API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Bridge is not connected")]
    NotConnected,

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Location not found: {name}")]
    LocationNotFound { name: String },

    #[error("No locations visible to this account")]
    NoLocations,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<scoutly_api::Error> for CoreError {
    fn from(err: scoutly_api::Error) -> Self {
        match err {
            scoutly_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            scoutly_api::Error::SessionExpired | scoutly_api::Error::NotAuthenticated => {
                CoreError::AuthenticationFailed {
                    message: "session expired -- re-authentication required".into(),
                }
            }
            scoutly_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            scoutly_api::Error::Api { status: 404, message } => CoreError::DeviceNotFound {
                identifier: message,
            },
            scoutly_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            scoutly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: e.to_string(),
            },
            scoutly_api::Error::Tls(message) => CoreError::ConnectionFailed {
                url: "<tls>".into(),
                reason: message,
            },
            scoutly_api::Error::ChannelConnect(message)
            | scoutly_api::Error::ChannelClosed { reason: message, .. } => {
                CoreError::Internal(format!("push channel failure: {message}"))
            }
            scoutly_api::Error::Deserialization { message, .. } => {
                CoreError::Api { message, status: None }
            }
        }
    }
}
