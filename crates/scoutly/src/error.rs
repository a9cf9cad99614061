//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use scoutly_core::CoreError;

/// Exit codes for process termination.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to the Scout API at {url}")]
    #[diagnostic(
        code(scoutly::connection_failed),
        help(
            "Check your network connection and the base_url in your profile.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed for profile '{profile}'")]
    #[diagnostic(
        code(scoutly::auth_failed),
        help(
            "Verify the email and password for this account.\n\
             Run: scoutly config show"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(scoutly::no_credentials),
        help(
            "Set the SCOUT_PASSWORD environment variable,\n\
             or configure password_env with: scoutly config init"
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(scoutly::not_found),
        help("Run: scoutly {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("No locations visible to this account")]
    #[diagnostic(
        code(scoutly::no_locations),
        help("Verify the account has at least one Scout location set up.")
    )]
    NoLocations,

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error: {message}")]
    #[diagnostic(code(scoutly::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(scoutly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(scoutly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: scoutly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(scoutly::no_config),
        help(
            "Create one with: scoutly config init --email you@example.com\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(scoutly::config))]
    Config(Box<figment::Error>),

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out")]
    #[diagnostic(
        code(scoutly::timeout),
        help("Increase the timeout with --timeout or check your connection.")
    )]
    Timeout,

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(scoutly::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::NoLocations => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "current".into(),
                message,
            },

            CoreError::NotConnected => CliError::ConnectionFailed {
                url: "(disconnected)".into(),
                reason: "Bridge connection was lost".into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::DeviceNotFound { identifier } => CliError::NotFound {
                resource_type: "device".into(),
                identifier,
                list_command: "devices list".into(),
            },

            CoreError::LocationNotFound { name } => CliError::NotFound {
                resource_type: "location".into(),
                identifier: name,
                list_command: "devices list".into(),
            },

            CoreError::NoLocations => CliError::NoLocations,

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                message,
                status: None,
            },
        }
    }
}

impl From<scoutly_config::ConfigError> for CliError {
    fn from(err: scoutly_config::ConfigError) -> Self {
        match err {
            scoutly_config::ConfigError::NoCredentials { profile } => {
                CliError::NoCredentials { profile }
            }
            scoutly_config::ConfigError::Validation { field, reason } => {
                CliError::Validation { field, reason }
            }
            scoutly_config::ConfigError::Figment(e) => CliError::Config(e),
            scoutly_config::ConfigError::Io(e) => CliError::Io(e),
            scoutly_config::ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },
        }
    }
}
