//! Shared configuration for the Scoutly CLI.
//!
//! TOML profiles, credential resolution (env + plaintext), and
//! translation to `scoutly_core::BridgeConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use scoutly_core::BridgeConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named account profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Account email.
    pub email: String,

    /// Password (plaintext — prefer env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Location to bridge, by id or name. Omit for the account's first
    /// location.
    pub location: Option<String>,

    /// REST base URL override.
    pub base_url: Option<String>,

    /// Push channel URL override.
    pub ws_url: Option<String>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Disable the push channel for this profile.
    pub channel: Option<bool>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "scoutly", "scoutly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("scoutly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit path (environment still applies).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SCOUTLY_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the account password from the credential chain.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Well-known env var
    if let Ok(val) = std::env::var("SCOUT_PASSWORD") {
        return Ok(SecretString::from(val));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── BridgeConfig translation ────────────────────────────────────────

/// Build a `BridgeConfig` from a profile.
pub fn profile_to_bridge_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<BridgeConfig, ConfigError> {
    let mut config = BridgeConfig::default();

    if let Some(ref base) = profile.base_url {
        config.base_url = base.parse().map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {base}"),
        })?;
    }
    if let Some(ref ws) = profile.ws_url {
        config.ws_url = ws.parse().map_err(|_| ConfigError::Validation {
            field: "ws_url".into(),
            reason: format!("invalid URL: {ws}"),
        })?;
    }

    if profile.email.is_empty() {
        return Err(ConfigError::Validation {
            field: "email".into(),
            reason: "must not be empty".into(),
        });
    }

    config.email = profile.email.clone();
    config.password = resolve_password(profile, profile_name)?;
    config.location = profile.location.clone();
    if let Some(secs) = profile.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(channel) = profile.channel {
        config.channel_enabled = channel;
    }

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn profile(password: Option<&str>) -> Profile {
        Profile {
            email: "user@example.com".into(),
            password: password.map(Into::into),
            password_env: None,
            location: None,
            base_url: None,
            ws_url: None,
            timeout: None,
            channel: None,
        }
    }

    #[test]
    fn plaintext_password_resolves() {
        let secret = resolve_password(&profile(Some("hunter2")), "default").unwrap();
        assert_eq!(secret.expose_secret(), "hunter2");
    }

    #[test]
    fn missing_password_is_an_error() {
        let err = resolve_password(&profile(None), "home").unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { profile } if profile == "home"));
    }

    #[test]
    fn profile_translates_to_bridge_config() {
        let mut p = profile(Some("hunter2"));
        p.location = Some("Beach House".into());
        p.timeout = Some(5);
        p.channel = Some(false);

        let config = profile_to_bridge_config(&p, "default").unwrap();
        assert_eq!(config.email, "user@example.com");
        assert_eq!(config.location.as_deref(), Some("Beach House"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.channel_enabled);
        assert_eq!(config.base_url.as_str(), "https://api.scoutalarm.com/");
    }

    #[test]
    fn url_overrides_apply() {
        let mut p = profile(Some("pw"));
        p.base_url = Some("https://api.example.test/v1".into());
        p.ws_url = Some("wss://events.example.test".into());

        let config = profile_to_bridge_config(&p, "default").unwrap();
        assert_eq!(config.base_url.as_str(), "https://api.example.test/v1");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let mut p = profile(Some("pw"));
        p.base_url = Some("not a url".into());

        let err = profile_to_bridge_config(&p, "default").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { field, .. } if field == "base_url"));
    }

    #[test]
    fn empty_email_is_rejected() {
        let mut p = profile(Some("pw"));
        p.email.clear();

        let err = profile_to_bridge_config(&p, "default").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { field, .. } if field == "email"));
    }

    #[test]
    fn config_round_trips_through_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert("home".into(), profile(Some("pw")));
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.default_profile.as_deref(), Some("default"));
        assert_eq!(loaded.profiles["home"].email, "user@example.com");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(loaded.profiles.is_empty());
        assert_eq!(loaded.defaults.output, "table");
    }
}
