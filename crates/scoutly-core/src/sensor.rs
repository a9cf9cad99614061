//! The binary sensor entity: one per supported device.
//!
//! A [`BinarySensor`] is a stateless function of its current [`Device`]
//! record. The record lives in a `watch` channel; replacing it is the
//! "signal the host to re-render" step, and host-side consumers observe
//! replacements through [`subscribe`](BinarySensor::subscribe). The
//! sensor never mutates a record -- `refresh` swaps in a fresh one from
//! the directory wholesale.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use scoutly_api::ChangeEvent;

use crate::directory::DeviceDirectory;
use crate::error::CoreError;
use crate::model::{Device, DeviceId, SemanticClass};

/// Attribution tag surfaced in every sensor's attributes.
pub const ATTRIBUTION: &str = "Data provided by scoutalarm.com";

/// State attributes exposed to the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorAttributes {
    pub attribution: &'static str,
    pub device_id: DeviceId,
    /// Raw vendor type code (e.g. `"door_panel"`).
    pub device_type: String,
    pub battery_low: bool,
}

/// Device registry metadata for the host platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub sw_version: Option<String>,
}

/// A Scout device exposed as a binary on/off entity.
pub struct BinarySensor {
    id: DeviceId,
    record: watch::Sender<Arc<Device>>,
}

impl BinarySensor {
    /// Wrap a freshly fetched device record.
    pub fn new(device: Device) -> Self {
        let id = device.id.clone();
        let (record, _) = watch::channel(Arc::new(device));
        Self { id, record }
    }

    // ── Host entity contract ─────────────────────────────────────────

    /// Stable unique id (the vendor device id).
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Display name for the host UI.
    pub fn name(&self) -> String {
        self.current().display_name().to_owned()
    }

    /// The current on/off reading.
    pub fn is_active(&self) -> bool {
        self.current().is_active()
    }

    /// The host UI category.
    pub fn semantic_class(&self) -> SemanticClass {
        self.current().semantic_class()
    }

    /// False only when the device last reported a timeout.
    pub fn is_available(&self) -> bool {
        self.current().is_available()
    }

    /// State attributes for the host platform.
    pub fn attributes(&self) -> SensorAttributes {
        let record = self.current();
        SensorAttributes {
            attribution: ATTRIBUTION,
            device_id: record.id.clone(),
            device_type: record.vendor_type.clone(),
            battery_low: record.battery_low(),
        }
    }

    /// Device registry metadata (manufacturer / model / firmware).
    pub fn device_info(&self) -> DeviceInfo {
        let record = self.current();
        let Some(reported) = record.reported.as_ref() else {
            return DeviceInfo::default();
        };
        DeviceInfo {
            manufacturer: reported.manufacturer.clone(),
            model: reported.model.clone(),
            sw_version: reported.fw_version.clone(),
        }
    }

    /// State changes are push-driven; the host must not poll.
    pub fn should_poll(&self) -> bool {
        false
    }

    // ── Record access ────────────────────────────────────────────────

    /// The current record (cheap `Arc` clone).
    pub fn current(&self) -> Arc<Device> {
        self.record.borrow().clone()
    }

    /// Observe record replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Device>> {
        self.record.subscribe()
    }

    // ── Refresh paths ────────────────────────────────────────────────

    /// Re-fetch this device's record and replace the cached one.
    ///
    /// Transport failures propagate uncaught -- there is no retry at
    /// this layer.
    pub async fn refresh(&self, directory: &dyn DeviceDirectory) -> Result<(), CoreError> {
        debug!(device = %self.id, "refreshing sensor");
        let fresh = directory.get_device(&self.id).await?;
        self.apply(fresh);
        Ok(())
    }

    /// Handle a push event: refresh iff it names this device.
    ///
    /// Returns whether a refresh ran.
    pub async fn handle_change(
        &self,
        event: &ChangeEvent,
        directory: &dyn DeviceDirectory,
    ) -> Result<bool, CoreError> {
        if event.id != self.id.as_str() {
            return Ok(false);
        }
        self.refresh(directory).await?;
        Ok(true)
    }

    /// Replace the cached record (used by refresh and bridge resync).
    pub(crate) fn apply(&self, fresh: Device) {
        // send_replace notifies watchers even with zero receivers.
        self.record.send_replace(Arc::new(fresh));
    }
}
