//! Best-effort propagation of dataset mutations across admin instances.
//!
//! Two independent inbound channels feed each workspace: direct broadcast
//! messages on the shared hub, and storage-change notifications from a file
//! watcher over the store directory. Both converge on the workspace's single
//! apply-external-update path. There is no acknowledgement, ordering
//! guarantee, or conflict detection between concurrent writers: the last
//! applied write wins.

use std::sync::Arc;

use chrono::Utc;
use notify::{EventKind, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::store::{Dataset, JsonStore, Workspace};

/// Discriminator carried by every hub message.
pub const UPDATE_TYPE: &str = "dataset:update";

fn update_kind() -> String {
    UPDATE_TYPE.to_string()
}

/// Message broadcast after every successful write-through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetUpdate {
    #[serde(rename = "type", default = "update_kind")]
    pub kind: String,
    pub dataset: Dataset,
    /// Full snapshot of the collection as a JSON array.
    pub data: serde_json::Value,
    /// Identifies the emitting instance for the lifetime of its process.
    pub origin: Uuid,
    /// Emission time, epoch millis.
    pub ts: i64,
}

impl DatasetUpdate {
    pub fn new(dataset: Dataset, data: serde_json::Value, origin: Uuid) -> Self {
        Self {
            kind: update_kind(),
            dataset,
            data,
            origin,
            ts: Utc::now().timestamp_millis(),
        }
    }

    pub fn is_update(&self) -> bool {
        self.kind == UPDATE_TYPE
    }
}

/// Shared broadcast channel connecting every workspace in the process.
#[derive(Clone)]
pub struct SyncHub {
    tx: broadcast::Sender<DatasetUpdate>,
}

impl SyncHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    /// Fire-and-forget: a hub with no listeners drops the message.
    pub fn publish(&self, update: DatasetUpdate) {
        let _ = self.tx.send(update);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DatasetUpdate> {
        self.tx.subscribe()
    }
}

impl Default for SyncHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies foreign hub messages to the workspace until the hub closes.
///
/// Self-origin messages are filtered inside the workspace, so subscribing a
/// workspace to the hub it publishes on is safe.
pub fn spawn_hub_listener(workspace: Arc<Workspace>) -> JoinHandle<()> {
    let mut rx = workspace.hub().subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(update) => {
                    if update.is_update() {
                        workspace.apply_update(&update).await;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("sync listener lagged, skipped {} updates", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Watches the store directory and feeds foreign file changes into the
/// workspace. This is the fallback channel when broadcast messages are
/// unavailable (a peer process without hub connectivity still writes files).
pub fn spawn_storage_watcher(
    workspace: Arc<Workspace>,
    store: Arc<JsonStore>,
) -> notify::Result<JoinHandle<()>> {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<notify::Event>(16);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) => {
                let _ = tx.blocking_send(event);
            }
            Err(err) => tracing::warn!("storage watcher error: {}", err),
        }
    })?;
    watcher.watch(store.dir(), RecursiveMode::NonRecursive)?;

    Ok(tokio::spawn(async move {
        // The watcher must stay alive as long as the task runs.
        let _watcher = watcher;
        while let Some(event) = rx.recv().await {
            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                continue;
            }
            for path in &event.paths {
                let Some(dataset) = Dataset::from_storage_path(path) else {
                    continue;
                };
                let Ok(raw) = std::fs::read_to_string(path) else {
                    continue;
                };
                if store.wrote(dataset, &raw) {
                    // Our own write-through; storage events only fire for
                    // foreign writers.
                    continue;
                }
                workspace.apply_storage_event(dataset, &raw).await;
            }
        }
    }))
}
