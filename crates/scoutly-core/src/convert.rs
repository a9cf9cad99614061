// ── Wire → canonical conversion ──
//
// Everything the wire layer leaves loose gets pinned down here:
// type codes become DeviceKind, duck-typed trigger payloads become
// TriggerState, and the not-always-boolean `timedout` collapses to a
// bool. Malformed or missing fields never fail -- they default safe.

use chrono::{DateTime, Utc};

use scoutly_api::models::{ApiDevice, ApiReported, ApiTriggerState};

use crate::model::{Device, DeviceId, DeviceKind, Reported, TriggerState};

/// Convert a wire device record into the canonical form.
pub fn device_from_api(api: ApiDevice, fetched_at: DateTime<Utc>) -> Device {
    let kind = DeviceKind::from_code(&api.device_type);
    Device {
        id: DeviceId::from(api.id),
        name: api.name,
        kind,
        vendor_type: api.device_type,
        reported: api.reported.map(reported_from_api),
        fetched_at,
    }
}

fn reported_from_api(api: ApiReported) -> Reported {
    Reported {
        trigger: api.trigger.and_then(|t| t.state).map(trigger_state_from_api),
        battery_low: api.battery.is_some_and(|b| b.low),
        manufacturer: api.manufacturer,
        fw_version: api.fw_version,
        model: api.model,
        // Only a literal true means timed out; false, absent, or
        // garbage all read as "not timed out".
        timed_out: api.timedout == Some(serde_json::Value::Bool(true)),
    }
}

fn trigger_state_from_api(state: ApiTriggerState) -> TriggerState {
    match state {
        ApiTriggerState::Simple(s) => TriggerState::Simple(s),
        ApiTriggerState::SmokeCo { smoke, co } => TriggerState::SmokeCo { smoke, co },
    }
}
