// ── Runtime bridge configuration ──
//
// Describes *how* to reach the Scout API. Carries credential data and
// connection tuning, but never touches disk -- the CLI constructs a
// `BridgeConfig` from its profile layer and hands it in.

use secrecy::SecretString;
use url::Url;

use scoutly_api::ReconnectConfig;

/// Configuration for connecting one bridge to one Scout account.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// REST base URL.
    pub base_url: Url,
    /// Push channel URL.
    pub ws_url: Url,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: SecretString,
    /// Location to bridge, by id or name. `None` selects the account's
    /// first location.
    pub location: Option<String>,
    /// Request timeout.
    pub timeout: std::time::Duration,
    /// Enable the push channel. When disabled, sensor state only moves
    /// on explicit `refresh()` / `resync()` calls.
    pub channel_enabled: bool,
    /// Push channel reconnection tuning.
    pub reconnect: ReconnectConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://api.scoutalarm.com")
                .expect("default base url is valid"),
            ws_url: Url::parse("wss://events.scoutalarm.com/devices")
                .expect("default ws url is valid"),
            email: String::new(),
            password: SecretString::from(String::new()),
            location: None,
            timeout: std::time::Duration::from_secs(30),
            channel_enabled: true,
            reconnect: ReconnectConfig::default(),
        }
    }
}
