mod device;

pub use device::{Device, DeviceId, DeviceKind, Reported, SemanticClass, TriggerState};
