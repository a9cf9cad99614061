//! CLI configuration — thin wrapper around `scoutly_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--email, --location, --timeout).

use std::time::Duration;

use scoutly_core::BridgeConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use scoutly_config::{
    Config, Profile, config_path, load_config_or_default, profile_to_bridge_config, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Translate a `Profile` + global flags into a `BridgeConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<BridgeConfig, CliError> {
    let mut config = profile_to_bridge_config(profile, profile_name)?;

    if let Some(ref email) = global.email {
        config.email = email.clone();
    }
    if let Some(ref location) = global.location {
        config.location = Some(location.clone());
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    Ok(config)
}
