//! In-process realtime store.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

use super::{CallbackSlot, RealtimeStore, SnapshotCallback, StoreSubscription};
use crate::error::StoreError;

/// In-memory realtime store with snapshot fan-out.
///
/// Values live at leaf paths (`review/123`, `reactions/123/👍`); a
/// subscriber at any ancestor path receives the subtree assembled into
/// nested JSON. Every clone shares the same underlying store, so separate
/// components (or simulated clients) observe each other's writes.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    /// Leaf path -> value. Ordered, so sibling keys come back sorted.
    data: Mutex<BTreeMap<String, JsonValue>>,
    /// Registered listeners, pruned as they cancel.
    listeners: Mutex<Vec<Listener>>,
    /// Serializes snapshot delivery so subscribers observe writes in order.
    dispatch: Mutex<()>,
}

struct Listener {
    path: String,
    slot: Arc<CallbackSlot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the snapshot value at `path` from the leaf map.
    fn snapshot_at(data: &BTreeMap<String, JsonValue>, path: &str) -> JsonValue {
        if let Some(value) = data.get(path) {
            return value.clone();
        }

        let prefix = format!("{}/", path);
        let mut root = Map::new();
        for (key, value) in data.range(prefix.clone()..) {
            let Some(relative) = key.strip_prefix(&prefix) else {
                break;
            };
            insert_nested(&mut root, relative, value.clone());
        }

        if root.is_empty() {
            JsonValue::Null
        } else {
            JsonValue::Object(root)
        }
    }

    /// True when a write at `written` is visible to a listener at `path`.
    fn covers(path: &str, written: &str) -> bool {
        written == path || written.starts_with(&format!("{}/", path))
    }
}

/// Insert a value into a nested JSON object at a `/`-separated relative key.
fn insert_nested(object: &mut Map<String, JsonValue>, relative: &str, value: JsonValue) {
    match relative.split_once('/') {
        None => {
            object.insert(relative.to_string(), value);
        }
        Some((head, rest)) => {
            let child = object
                .entry(head.to_string())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if let JsonValue::Object(map) = child {
                insert_nested(map, rest, value);
            }
        }
    }
}

#[async_trait]
impl RealtimeStore for MemoryStore {
    async fn write(&self, path: &str, value: JsonValue) -> Result<(), StoreError> {
        if path.is_empty() || path.split('/').any(str::is_empty) {
            return Err(StoreError::WriteFailed {
                path: path.to_string(),
                message: "empty path segment".to_string(),
            });
        }

        // Deliveries for this write complete before the next write's begin,
        // so no subscriber observes snapshots out of order.
        let _dispatch = self.inner.dispatch.lock().unwrap();

        let targets: Vec<(Arc<CallbackSlot>, JsonValue)> = {
            let mut data = self.inner.data.lock().unwrap();
            data.insert(path.to_string(), value);

            let mut listeners = self.inner.listeners.lock().unwrap();
            listeners.retain(|l| !l.slot.is_cancelled());
            listeners
                .iter()
                .filter(|l| Self::covers(&l.path, path))
                .map(|l| (l.slot.clone(), Self::snapshot_at(&data, &l.path)))
                .collect()
        };

        for (slot, snapshot) in targets {
            slot.deliver(snapshot);
        }

        Ok(())
    }

    async fn read(&self, path: &str) -> Option<JsonValue> {
        let data = self.inner.data.lock().unwrap();
        match Self::snapshot_at(&data, path) {
            JsonValue::Null => None,
            value => Some(value),
        }
    }

    fn subscribe(&self, path: &str, callback: SnapshotCallback) -> StoreSubscription {
        let slot = Arc::new(CallbackSlot::new(callback));

        let _dispatch = self.inner.dispatch.lock().unwrap();

        let initial = {
            let data = self.inner.data.lock().unwrap();
            Self::snapshot_at(&data, path)
        };

        self.inner.listeners.lock().unwrap().push(Listener {
            path: path.to_string(),
            slot: slot.clone(),
        });

        // Snapshot semantics: the current value is delivered immediately.
        slot.deliver(initial);

        StoreSubscription::new(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::mpsc;

    #[tokio::test]
    async fn test_subscribe_delivers_initial_snapshot() {
        let store = MemoryStore::new();
        store.write("review/1", json!({"comment": "hi"})).await.unwrap();

        let (tx, rx) = mpsc::channel();
        let _sub = store.subscribe(
            "review",
            Box::new(move |snapshot| {
                tx.send(snapshot).unwrap();
            }),
        );

        let first = rx.try_recv().unwrap();
        assert_eq!(first["1"]["comment"], "hi");
    }

    #[tokio::test]
    async fn test_write_fans_out_to_ancestor_subscribers() {
        let store = MemoryStore::new();
        let (tx, rx) = mpsc::channel();
        let _sub = store.subscribe(
            "reactions/42",
            Box::new(move |snapshot| {
                tx.send(snapshot).unwrap();
            }),
        );

        assert_eq!(rx.try_recv().unwrap(), JsonValue::Null);

        store.write("reactions/42/👍", json!(1)).await.unwrap();
        let snapshot = rx.try_recv().unwrap();
        assert_eq!(snapshot["👍"], 1);
    }

    #[tokio::test]
    async fn test_unrelated_paths_do_not_notify() {
        let store = MemoryStore::new();
        let (tx, rx) = mpsc::channel();
        let _sub = store.subscribe(
            "review",
            Box::new(move |snapshot| {
                tx.send(snapshot).unwrap();
            }),
        );
        rx.try_recv().unwrap(); // initial

        store.write("reactions/1/👍", json!(1)).await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery_and_is_idempotent() {
        let store = MemoryStore::new();
        let (tx, rx) = mpsc::channel();
        let sub = store.subscribe(
            "review",
            Box::new(move |snapshot| {
                tx.send(snapshot).unwrap();
            }),
        );
        rx.try_recv().unwrap(); // initial

        sub.unsubscribe();
        sub.unsubscribe();

        store.write("review/1", json!({"comment": "late"})).await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_empty_path_segment_rejected() {
        let store = MemoryStore::new();
        assert!(store.write("", json!(1)).await.is_err());
        assert!(store.write("review//1", json!(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.write("review/1", json!({"comment": "hi"})).await.unwrap();
        assert!(other.read("review/1").await.is_some());
    }
}
