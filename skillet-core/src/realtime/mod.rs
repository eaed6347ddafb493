//! Realtime data store collaborator.
//!
//! The backing service is opaque: it supports path-keyed writes and
//! snapshot-style subscriptions that redeliver the whole value under a
//! path. [`MemoryStore`] is the in-process implementation used by tests
//! and local development.

mod memory;

pub use memory::MemoryStore;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::StoreError;

/// Callback receiving the full value at the subscribed path.
pub type SnapshotCallback = Box<dyn FnMut(JsonValue) + Send>;

/// Trait for realtime data stores.
///
/// `subscribe` delivers the current value immediately, then the whole
/// updated value after every write at or under the path. Missing data is
/// delivered as JSON null.
#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Write a value at a path, replacing whatever was there.
    async fn write(&self, path: &str, value: JsonValue) -> Result<(), StoreError>;

    /// Read the current value at a path.
    async fn read(&self, path: &str) -> Option<JsonValue>;

    /// Subscribe to snapshot updates at a path.
    fn subscribe(&self, path: &str, callback: SnapshotCallback) -> StoreSubscription;
}

/// A registered listener's callback slot.
///
/// Snapshots are delivered while the slot is locked, so emptying the slot
/// under the same lock guarantees no delivery happens after `unsubscribe`
/// returns.
pub(crate) struct CallbackSlot {
    callback: Mutex<Option<SnapshotCallback>>,
}

impl CallbackSlot {
    pub(crate) fn new(callback: SnapshotCallback) -> Self {
        Self {
            callback: Mutex::new(Some(callback)),
        }
    }

    /// Deliver a snapshot if the listener is still live.
    pub(crate) fn deliver(&self, snapshot: JsonValue) {
        let mut guard = self.callback.lock().unwrap();
        if let Some(callback) = guard.as_mut() {
            callback(snapshot);
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.callback.lock().unwrap().is_none()
    }

    fn cancel(&self) {
        self.callback.lock().unwrap().take();
    }
}

/// Cancellation handle for a store subscription.
///
/// `unsubscribe` is idempotent and deterministic: once it returns, the
/// callback will not run again. Dropping the handle unsubscribes too.
pub struct StoreSubscription {
    slot: Arc<CallbackSlot>,
}

impl StoreSubscription {
    pub(crate) fn new(slot: Arc<CallbackSlot>) -> Self {
        Self { slot }
    }

    pub fn unsubscribe(&self) {
        self.slot.cancel();
    }
}

impl Drop for StoreSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
