//! Async client for the Scout Alarm API.
//!
//! Two surfaces:
//!
//! - **REST** ([`ScoutClient`]) — JWT-authenticated JSON endpoints for
//!   locations and devices. This is the device directory: every sensor
//!   record the bridge exposes originates here.
//! - **Push channel** ([`ChannelHandle`]) — WebSocket stream of device
//!   change notifications with automatic reconnection. Events carry at
//!   least the id of the device whose reported state changed server-side.
//!
//! Wire types in [`models`] are deliberately lossy-tolerant: the vendor
//! omits nested objects freely and occasionally sends non-boolean values
//! in boolean fields, so everything optional stays `Option` and open-ended
//! fields stay [`serde_json::Value`].

pub mod auth;
pub mod channel;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{AuthSession, Credentials};
pub use channel::{ChangeEvent, ChannelHandle, ReconnectConfig};
pub use client::ScoutClient;
pub use error::Error;
pub use models::{ApiBattery, ApiDevice, ApiLocation, ApiReported, ApiTrigger, ApiTriggerState};
pub use transport::TransportConfig;
