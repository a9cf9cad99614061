// ── Device domain types ──
//
// Canonical forms of the vendor's wire payloads. The vendor dispatches
// on type-code strings and duck-typed trigger payloads; here both are
// closed enums so every consumer match is exhaustive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Vendor trigger-state constants.
pub const STATE_OPEN: &str = "open";
pub const STATE_WET: &str = "wet";
pub const STATE_MOTION_START: &str = "motion-start";
pub const STATE_OK: &str = "ok";

// ── DeviceId ────────────────────────────────────────────────────────

/// Stable identifier for a Scout device. Opaque string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DeviceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ── DeviceKind ──────────────────────────────────────────────────────

/// Canonical sensor kind -- normalized from the vendor's type code.
///
/// Closed set: any code outside the supported six becomes
/// [`Unknown`](Self::Unknown), which carries defined default behavior
/// (never active, generic semantic class) rather than a string fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DeviceKind {
    DoorPanel,
    AccessSensor,
    MotionSensor,
    SmokeAlarm,
    WaterSensor,
    GlassBreak,
    Unknown,
}

impl DeviceKind {
    /// Parse a vendor type code. Unrecognized codes map to `Unknown`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "door_panel" => Self::DoorPanel,
            "access_sensor" => Self::AccessSensor,
            "motion_sensor" => Self::MotionSensor,
            "smoke_alarm" => Self::SmokeAlarm,
            "water_sensor" => Self::WaterSensor,
            "glass_break" => Self::GlassBreak,
            _ => Self::Unknown,
        }
    }

    /// Whether the bridge exposes this kind as a binary sensor.
    /// Unsupported kinds are filtered out at setup.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

// ── TriggerState ────────────────────────────────────────────────────

/// The trigger's state payload: a plain string for most kinds, smoke/CO
/// sub-states for combo smoke alarms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerState {
    Simple(String),
    SmokeCo {
        smoke: String,
        co: Option<String>,
    },
}

impl TriggerState {
    /// The plain string state, if this is not a combo payload.
    pub fn as_simple(&self) -> Option<&str> {
        match self {
            Self::Simple(s) => Some(s.as_str()),
            Self::SmokeCo { .. } => None,
        }
    }

    fn is_simple(&self, expected: &str) -> bool {
        self.as_simple() == Some(expected)
    }
}

// ── Reported ────────────────────────────────────────────────────────

/// Normalized last-known telemetry for a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reported {
    pub trigger: Option<TriggerState>,
    /// False when the vendor sent no battery info at all.
    pub battery_low: bool,
    pub manufacturer: Option<String>,
    pub fw_version: Option<String>,
    pub model: Option<String>,
    /// True iff the wire value was literally `true`.
    pub timed_out: bool,
}

// ── SemanticClass ───────────────────────────────────────────────────

/// Host-platform category label, used for UI iconography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticClass {
    Door,
    Window,
    Smoke,
    Motion,
    Moisture,
    Vibration,
    Opening,
}

impl SemanticClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Door => "door",
            Self::Window => "window",
            Self::Smoke => "smoke",
            Self::Motion => "motion",
            Self::Moisture => "moisture",
            Self::Vibration => "vibration",
            Self::Opening => "opening",
        }
    }
}

impl fmt::Display for SemanticClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Device ──────────────────────────────────────────────────────────

/// The canonical device record. Fetched fresh from the directory and
/// replaced wholesale on every refresh -- never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: Option<String>,
    pub kind: DeviceKind,
    /// Raw vendor type code, kept for attribute reporting.
    pub vendor_type: String,
    pub reported: Option<Reported>,
    pub fetched_at: DateTime<Utc>,
}

impl Device {
    /// Display name: the vendor name, or the id when unnamed.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.id.as_str())
    }

    fn trigger(&self) -> Option<&TriggerState> {
        self.reported.as_ref().and_then(|r| r.trigger.as_ref())
    }

    /// The on/off reading. Absent `reported` or `trigger` is never an
    /// error -- it means "no active trigger", i.e. false.
    pub fn is_active(&self) -> bool {
        let Some(trigger) = self.trigger() else {
            return false;
        };

        match self.kind {
            DeviceKind::DoorPanel | DeviceKind::AccessSensor => trigger.is_simple(STATE_OPEN),
            DeviceKind::MotionSensor => trigger.is_simple(STATE_MOTION_START),
            DeviceKind::WaterSensor => trigger.is_simple(STATE_WET),
            // Loose inequality on purpose: a combo payload on a
            // glass-break sensor also counts as "not ok".
            DeviceKind::GlassBreak => !trigger.is_simple(STATE_OK),
            DeviceKind::SmokeAlarm => match trigger {
                // Combo devices report co alongside smoke; absent co
                // reads as "ok".
                TriggerState::SmokeCo { smoke, co } => {
                    smoke != STATE_OK || co.as_deref().unwrap_or(STATE_OK) != STATE_OK
                }
                // A plain string here is not a smoke reading; treat as
                // no data rather than failing.
                TriggerState::Simple(_) => false,
            },
            DeviceKind::Unknown => false,
        }
    }

    /// The host UI category for this device.
    ///
    /// Kinds without a fixed mapping (access sensors, unknowns) fall
    /// back to a name-substring heuristic before defaulting to
    /// `Opening`.
    pub fn semantic_class(&self) -> SemanticClass {
        match self.kind {
            DeviceKind::DoorPanel => SemanticClass::Door,
            DeviceKind::SmokeAlarm => SemanticClass::Smoke,
            DeviceKind::MotionSensor => SemanticClass::Motion,
            DeviceKind::WaterSensor => SemanticClass::Moisture,
            DeviceKind::GlassBreak => SemanticClass::Vibration,
            DeviceKind::AccessSensor | DeviceKind::Unknown => self.class_from_name(),
        }
    }

    fn class_from_name(&self) -> SemanticClass {
        let name = self.name.as_deref().unwrap_or("").to_lowercase();
        if name.contains("door") {
            SemanticClass::Door
        } else if name.contains("window") {
            SemanticClass::Window
        } else {
            SemanticClass::Opening
        }
    }

    /// False only when the device reported a timeout.
    pub fn is_available(&self) -> bool {
        !self.reported.as_ref().is_some_and(|r| r.timed_out)
    }

    /// Battery-low flag; false when no battery info was reported.
    pub fn battery_low(&self) -> bool {
        self.reported.as_ref().is_some_and(|r| r.battery_low)
    }
}
