//! Domain layer between `scoutly-api` and consumers (CLI, host platforms).
//!
//! This crate owns the canonical model and the sensor mapping logic:
//!
//! - **[`Bridge`]** — Lifecycle facade: [`connect()`](Bridge::connect)
//!   authenticates, enumerates the location's devices, builds one
//!   [`BinarySensor`] per supported device, and spawns the change-routing
//!   task that dispatches push events to the owning sensor.
//!
//! - **[`BinarySensor`]** — One per supported device. Holds the current
//!   [`Device`] record in a `watch` channel and derives everything the
//!   host needs from it: on/off state, semantic class, availability,
//!   attributes, device metadata. Push-driven (`should_poll()` is false).
//!
//! - **[`DeviceDirectory`]** — The seam to the vendor API: enumerate
//!   devices, re-fetch one by id. Implemented by [`ScoutDirectory`];
//!   tests substitute an in-memory fake.
//!
//! - **Domain model** ([`model`]) — Canonical types ([`Device`],
//!   [`DeviceKind`], [`TriggerState`], [`SemanticClass`], ...) with the
//!   vendor's duck-typed payloads normalized into closed enums.

pub mod bridge;
pub mod config;
pub mod convert;
pub mod directory;
pub mod error;
pub mod model;
pub mod sensor;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bridge::{Bridge, ConnectionState};
pub use config::BridgeConfig;
pub use directory::{DeviceDirectory, ScoutDirectory};
pub use error::CoreError;
pub use sensor::{ATTRIBUTION, BinarySensor, DeviceInfo, SensorAttributes};
pub use store::SensorStore;

// Push-channel types consumers need when handling raw events.
pub use scoutly_api::{ChangeEvent, ReconnectConfig};

// Re-export model types at the crate root for ergonomics.
pub use model::{Device, DeviceId, DeviceKind, Reported, SemanticClass, TriggerState};
