// ── Bridge abstraction ──
//
// Full lifecycle management for one Scout account connection.
// Handles authentication, device enumeration, sensor construction,
// and routing of push events to the owning sensor.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use scoutly_api::{ChangeEvent, ChannelHandle, Credentials, ScoutClient, TransportConfig};
use secrecy::ExposeSecret;

use crate::config::BridgeConfig;
use crate::directory::{DeviceDirectory, ScoutDirectory};
use crate::error::CoreError;
use crate::model::{Device, DeviceId};
use crate::sensor::BinarySensor;
use crate::store::SensorStore;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Bridge ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<BridgeInner>`. Manages the connection
/// lifecycle: authentication, device enumeration, sensor setup, and
/// push-event routing.
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    config: BridgeConfig,
    store: Arc<SensorStore>,
    connection_state: watch::Sender<ConnectionState>,
    /// Cancellation token for the current connection. Each `connect()`
    /// installs a fresh one, so a prior `shutdown()` cannot leave the
    /// bridge permanently cancelled.
    cancel: Mutex<CancellationToken>,
    client: Mutex<Option<Arc<ScoutClient>>>,
    directory: Mutex<Option<Arc<ScoutDirectory>>>,
    /// Push channel handle (populated on connect if enabled). Owning it
    /// here means sensor subscriptions die with the bridge instead of
    /// leaking into the host.
    channel: Mutex<Option<ChannelHandle>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Bridge {
    /// Create a new Bridge from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to authenticate and start the
    /// event routing task.
    pub fn new(config: BridgeConfig) -> Self {
        let store = Arc::new(SensorStore::new());
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            inner: Arc::new(BridgeInner {
                config,
                store,
                connection_state,
                cancel: Mutex::new(CancellationToken::new()),
                client: Mutex::new(None),
                directory: Mutex::new(None),
                channel: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the bridge configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Access the underlying sensor store.
    pub fn store(&self) -> &Arc<SensorStore> {
        &self.inner.store
    }

    /// Look up one sensor by device id.
    pub fn sensor(&self, id: &DeviceId) -> Option<Arc<BinarySensor>> {
        self.inner.store.get(id)
    }

    /// Snapshot of all live sensors.
    pub fn sensors(&self) -> Arc<Vec<Arc<BinarySensor>>> {
        self.inner.store.snapshot()
    }

    /// Observe connection state changes.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// The device directory for the connected location.
    pub async fn directory(&self) -> Result<Arc<ScoutDirectory>, CoreError> {
        self.inner
            .directory
            .lock()
            .await
            .clone()
            .ok_or(CoreError::NotConnected)
    }

    /// Subscribe to the raw push event stream.
    pub async fn events(&self) -> Result<broadcast::Receiver<Arc<ChangeEvent>>, CoreError> {
        let guard = self.inner.channel.lock().await;
        guard
            .as_ref()
            .map(ChannelHandle::subscribe)
            .ok_or(CoreError::NotConnected)
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the Scout API.
    ///
    /// Authenticates, resolves the configured location, enumerates its
    /// devices, builds one sensor per supported device (unsupported
    /// kinds are silently skipped), and -- if enabled -- opens the push
    /// channel and spawns the event routing task.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        match self.connect_inner().await {
            Ok(()) => {
                let _ = self.inner.connection_state.send(ConnectionState::Connected);
                Ok(())
            }
            Err(e) => {
                let _ = self.inner.connection_state.send(ConnectionState::Failed);
                Err(e)
            }
        }
    }

    async fn connect_inner(&self) -> Result<(), CoreError> {
        let config = &self.inner.config;

        // Fresh token for this connection (supports reconnect after a
        // shutdown).
        let cancel = CancellationToken::new();
        *self.inner.cancel.lock().await = cancel.clone();

        let transport = TransportConfig {
            timeout: config.timeout,
            ..TransportConfig::default()
        };
        let credentials = Credentials::new(config.email.clone(), config.password.clone());
        let client = Arc::new(ScoutClient::new(
            config.base_url.as_str(),
            credentials,
            &transport,
        )?);

        client.authenticate().await?;
        info!("authenticated with Scout API");

        let location_id = self.resolve_location(&client).await?;
        debug!(%location_id, "location resolved");

        let directory = Arc::new(ScoutDirectory::new(Arc::clone(&client), &location_id));

        let devices = directory.list_devices().await?;
        let total = devices.len();
        let mut supported = 0usize;
        for device in devices {
            if !device.kind.is_supported() {
                debug!(
                    device = %device.id,
                    vendor_type = %device.vendor_type,
                    "skipping unsupported device type"
                );
                continue;
            }
            supported += 1;
            self.inner
                .store
                .upsert(Arc::new(BinarySensor::new(device)));
        }
        info!(total, supported, "device enumeration complete");

        if config.channel_enabled {
            let token = client.bearer_token().map(|t| t.expose_secret().to_owned());
            let handle = ChannelHandle::connect(
                config.ws_url.clone(),
                config.reconnect.clone(),
                cancel.clone(),
                token,
            );

            let rx = handle.subscribe();
            let store = Arc::clone(&self.inner.store);
            let route_directory = Arc::clone(&directory);
            let task = tokio::spawn(async move {
                route_events(store, route_directory, rx, cancel).await;
            });

            self.inner.task_handles.lock().await.push(task);
            *self.inner.channel.lock().await = Some(handle);
        }

        *self.inner.client.lock().await = Some(client);
        *self.inner.directory.lock().await = Some(directory);

        Ok(())
    }

    /// Match the configured location by id or name; default to the
    /// account's first location.
    async fn resolve_location(&self, client: &ScoutClient) -> Result<String, CoreError> {
        let locations = client.list_locations().await?;

        match self.inner.config.location.as_deref() {
            Some(wanted) => locations
                .iter()
                .find(|l| l.id == wanted || l.name.as_deref() == Some(wanted))
                .map(|l| l.id.clone())
                .ok_or_else(|| CoreError::LocationNotFound {
                    name: wanted.to_owned(),
                }),
            None => locations
                .into_iter()
                .next()
                .map(|l| l.id)
                .ok_or(CoreError::NoLocations),
        }
    }

    /// Re-enumerate the location's devices and reconcile the store:
    /// refreshed records for surviving sensors, new sensors for new
    /// devices, removal for devices gone server-side.
    pub async fn resync(&self) -> Result<(), CoreError> {
        let directory = self.directory().await?;
        let devices = directory.list_devices().await?;
        apply_enumeration(&self.inner.store, devices);
        Ok(())
    }

    /// Tear the bridge down: stop the push channel and routing task.
    ///
    /// The bridge can be connected again afterwards.
    pub async fn shutdown(&self) {
        self.inner.cancel.lock().await.cancel();

        if let Some(handle) = self.inner.channel.lock().await.take() {
            handle.shutdown();
        }
        for task in self.inner.task_handles.lock().await.drain(..) {
            task.abort();
        }

        *self.inner.directory.lock().await = None;
        *self.inner.client.lock().await = None;
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        info!("bridge shut down");
    }
}

// ── Event routing ────────────────────────────────────────────────

/// Dispatch each push event to the owning sensor. Events for devices
/// the store does not track (unsupported kinds, other locations) are
/// dropped quietly.
async fn route_events(
    store: Arc<SensorStore>,
    directory: Arc<ScoutDirectory>,
    mut rx: broadcast::Receiver<Arc<ChangeEvent>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = rx.recv() => match result {
                Ok(event) => {
                    dispatch_event(&store, directory.as_ref(), &event).await;
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "event routing fell behind the push channel");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    debug!("event routing task exiting");
}

async fn dispatch_event(store: &SensorStore, directory: &dyn DeviceDirectory, event: &ChangeEvent) {
    let id = DeviceId::from(event.id.as_str());
    let Some(sensor) = store.get(&id) else {
        debug!(device = %id, "change event for untracked device");
        return;
    };

    if let Err(e) = sensor.handle_change(event, directory).await {
        warn!(device = %id, error = %e, "refresh after change event failed");
    }
}

/// Upsert-then-prune reconciliation of an enumeration result. Avoids
/// the brief empty state that clear-then-insert would cause.
fn apply_enumeration(store: &SensorStore, devices: Vec<Device>) {
    let mut incoming: Vec<DeviceId> = Vec::with_capacity(devices.len());

    for device in devices {
        if !device.kind.is_supported() {
            continue;
        }
        incoming.push(device.id.clone());

        if let Some(existing) = store.get(&device.id) {
            existing.apply(device);
        } else {
            store.upsert(Arc::new(BinarySensor::new(device)));
        }
    }

    for id in store.ids() {
        if !incoming.contains(&id) {
            debug!(device = %id, "pruning sensor for removed device");
            store.remove(&id);
        }
    }
}
