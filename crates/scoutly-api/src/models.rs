// Wire types for the Scout REST API.
//
// Everything here mirrors the JSON the vendor actually sends, not the
// shape we wish it sent. Nested objects are omitted freely (a device
// that has never reported has no `reported` at all), and `timedout` is
// not reliably a boolean -- it stays a raw Value until scoutly-core
// collapses it.

use serde::{Deserialize, Serialize};

/// A location (Scout's top-level grouping; devices belong to one).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLocation {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A device record as returned by `GET /devices/{id}` and the
/// per-location device listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDevice {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Vendor type code, e.g. `"door_panel"`, `"smoke_alarm"`.
    #[serde(rename = "type")]
    pub device_type: String,
    /// Last-known telemetry snapshot. Absent for devices that have
    /// never reported.
    #[serde(default)]
    pub reported: Option<ApiReported>,
}

/// The vendor's `reported` blob: last-known telemetry for a device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiReported {
    #[serde(default)]
    pub trigger: Option<ApiTrigger>,
    #[serde(default)]
    pub battery: Option<ApiBattery>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub fw_version: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// The vendor sends `true`, `false`, or occasionally something else
    /// entirely. Only a literal `true` means the device timed out.
    #[serde(default)]
    pub timedout: Option<serde_json::Value>,
}

/// The event/state payload indicating what caused the current reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTrigger {
    #[serde(default)]
    pub state: Option<ApiTriggerState>,
}

/// Trigger state: a plain string for most sensor kinds, an object with
/// `smoke` / `co` sub-states for combo smoke alarms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiTriggerState {
    SmokeCo {
        smoke: String,
        #[serde(default)]
        co: Option<String>,
    },
    Simple(String),
}

/// Battery telemetry. Only `low` matters to consumers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiBattery {
    #[serde(default)]
    pub low: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_door_device() {
        let raw = json!({
            "id": "d1",
            "name": "Front Door",
            "type": "door_panel",
            "reported": {
                "trigger": { "state": "open" },
                "battery": { "low": false },
                "manufacturer": "Scout",
                "fw_version": "1.2.3",
                "model": "DP-1",
                "timedout": false
            }
        });

        let device: ApiDevice = serde_json::from_value(raw).unwrap();
        assert_eq!(device.id, "d1");
        assert_eq!(device.device_type, "door_panel");

        let reported = device.reported.unwrap();
        let trigger = reported.trigger.unwrap();
        assert!(matches!(
            trigger.state,
            Some(ApiTriggerState::Simple(ref s)) if s == "open"
        ));
        assert!(!reported.battery.unwrap().low);
        assert_eq!(reported.timedout, Some(serde_json::Value::Bool(false)));
    }

    #[test]
    fn deserialize_smoke_combo_state() {
        let raw = json!({
            "id": "d2",
            "type": "smoke_alarm",
            "reported": {
                "trigger": { "state": { "smoke": "ok", "co": "alarm" } }
            }
        });

        let device: ApiDevice = serde_json::from_value(raw).unwrap();
        let state = device.reported.unwrap().trigger.unwrap().state.unwrap();
        match state {
            ApiTriggerState::SmokeCo { smoke, co } => {
                assert_eq!(smoke, "ok");
                assert_eq!(co.as_deref(), Some("alarm"));
            }
            ApiTriggerState::Simple(_) => panic!("expected combo state"),
        }
    }

    #[test]
    fn deserialize_smoke_without_co() {
        let raw = json!({ "state": { "smoke": "testing" } });
        let trigger: ApiTrigger = serde_json::from_value(raw).unwrap();
        match trigger.state.unwrap() {
            ApiTriggerState::SmokeCo { smoke, co } => {
                assert_eq!(smoke, "testing");
                assert!(co.is_none());
            }
            ApiTriggerState::Simple(_) => panic!("expected combo state"),
        }
    }

    #[test]
    fn deserialize_bare_device() {
        // No reported blob at all -- must still parse.
        let raw = json!({ "id": "d3", "type": "motion_sensor" });
        let device: ApiDevice = serde_json::from_value(raw).unwrap();
        assert!(device.reported.is_none());
        assert!(device.name.is_none());
    }

    #[test]
    fn timedout_garbage_is_preserved() {
        let raw = json!({
            "id": "d4",
            "type": "water_sensor",
            "reported": { "timedout": "maybe" }
        });
        let device: ApiDevice = serde_json::from_value(raw).unwrap();
        let timedout = device.reported.unwrap().timedout.unwrap();
        assert_eq!(timedout, serde_json::Value::String("maybe".into()));
    }
}
