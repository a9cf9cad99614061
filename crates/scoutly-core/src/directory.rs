// ── Device directory seam ──
//
// The one place the domain layer touches the vendor API. Kept behind a
// trait so sensor and bridge logic can be exercised against an
// in-memory fake.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use scoutly_api::ScoutClient;

use crate::convert::device_from_api;
use crate::error::CoreError;
use crate::model::{Device, DeviceId};

/// Read access to the vendor's device records.
///
/// Both operations are one-shot network calls; transport failures
/// propagate to the caller untouched (no retry here).
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// Enumerate every device at the bridged location.
    async fn list_devices(&self) -> Result<Vec<Device>, CoreError>;

    /// Re-fetch a single device's current record.
    async fn get_device(&self, id: &DeviceId) -> Result<Device, CoreError>;
}

/// Directory backed by the Scout REST API, scoped to one location.
pub struct ScoutDirectory {
    client: Arc<ScoutClient>,
    location_id: String,
}

impl ScoutDirectory {
    pub fn new(client: Arc<ScoutClient>, location_id: impl Into<String>) -> Self {
        Self {
            client,
            location_id: location_id.into(),
        }
    }

    /// Run an API call; on an expired session, re-authenticate once and
    /// run it again. Anything else propagates immediately.
    async fn with_reauth<T, F, Fut>(&self, call: F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, scoutly_api::Error>>,
    {
        match call().await {
            Ok(value) => Ok(value),
            Err(e) if e.is_auth_expired() => {
                debug!("session expired, re-authenticating");
                self.client.authenticate().await?;
                Ok(call().await?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl DeviceDirectory for ScoutDirectory {
    async fn list_devices(&self) -> Result<Vec<Device>, CoreError> {
        let devices = self
            .with_reauth(|| self.client.list_devices(&self.location_id))
            .await?;

        let fetched_at = Utc::now();
        Ok(devices
            .into_iter()
            .map(|d| device_from_api(d, fetched_at))
            .collect())
    }

    async fn get_device(&self, id: &DeviceId) -> Result<Device, CoreError> {
        let device = self
            .with_reauth(|| self.client.get_device(id.as_str()))
            .await?;
        Ok(device_from_api(device, Utc::now()))
    }
}
