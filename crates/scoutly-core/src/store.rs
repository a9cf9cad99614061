// ── Reactive sensor collection ──
//
// Lock-free concurrent storage with O(1) lookups and push-based
// change notification via a `watch` snapshot channel.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::DeviceId;
use crate::sensor::BinarySensor;

/// The bridge's set of live sensors.
///
/// Uses `DashMap` for O(1) concurrent lookups and a `watch` channel for
/// push-based snapshot notification. Every mutation bumps a version
/// counter and rebuilds the snapshot that subscribers receive.
pub struct SensorStore {
    by_id: DashMap<DeviceId, Arc<BinarySensor>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<BinarySensor>>>>,
}

impl Default for SensorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert or replace a sensor. Returns `true` if the id was new.
    pub fn upsert(&self, sensor: Arc<BinarySensor>) -> bool {
        let id = sensor.id().clone();
        let is_new = !self.by_id.contains_key(&id);
        self.by_id.insert(id, sensor);

        self.rebuild_snapshot();
        self.bump_version();

        is_new
    }

    /// Remove a sensor by id. Returns the removed sensor if it existed.
    pub fn remove(&self, id: &DeviceId) -> Option<Arc<BinarySensor>> {
        let removed = self.by_id.remove(id).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }

    /// Look up a sensor by device id.
    pub fn get(&self, id: &DeviceId) -> Option<Arc<BinarySensor>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<Vec<Arc<BinarySensor>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<BinarySensor>>>> {
        self.snapshot.subscribe()
    }

    /// Return all current device ids in the collection.
    pub fn ids(&self) -> Vec<DeviceId> {
        self.by_id.iter().map(|r| r.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all sensors into a snapshot vec and broadcast to
    /// subscribers.
    fn rebuild_snapshot(&self) {
        let values: Vec<Arc<BinarySensor>> =
            self.by_id.iter().map(|r| Arc::clone(r.value())).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    /// Increment the version counter.
    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Device, DeviceKind};
    use chrono::Utc;

    fn sensor(id: &str) -> Arc<BinarySensor> {
        Arc::new(BinarySensor::new(Device {
            id: DeviceId::from(id),
            name: None,
            kind: DeviceKind::DoorPanel,
            vendor_type: "door_panel".into(),
            reported: None,
            fetched_at: Utc::now(),
        }))
    }

    #[test]
    fn upsert_returns_true_for_new_id() {
        let store = SensorStore::new();
        assert!(store.upsert(sensor("d1")));
        assert!(!store.upsert(sensor("d1")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_and_remove() {
        let store = SensorStore::new();
        store.upsert(sensor("d1"));

        assert!(store.get(&DeviceId::from("d1")).is_some());

        let removed = store.remove(&DeviceId::from("d1"));
        assert!(removed.is_some());
        assert!(store.get(&DeviceId::from("d1")).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn snapshot_reflects_current_state() {
        let store = SensorStore::new();
        assert!(store.snapshot().is_empty());

        store.upsert(sensor("d1"));
        store.upsert(sensor("d2"));

        assert_eq!(store.snapshot().len(), 2);
        assert_eq!(store.ids().len(), 2);
    }

    #[test]
    fn subscribers_see_mutations() {
        let store = SensorStore::new();
        let mut rx = store.subscribe();

        store.upsert(sensor("d1"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
