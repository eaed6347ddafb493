//! Per-review emoji reaction counters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value as JsonValue};

use super::REACTIONS_PATH;
use crate::error::StoreError;
use crate::realtime::{RealtimeStore, StoreSubscription};
use crate::types::ReviewId;

/// Emoji identifier -> non-negative count for one review.
pub type ReactionMap = HashMap<String, u64>;

/// Applies and observes emoji reaction counters.
///
/// `increment` is a read-modify-write over the network, not a server-side
/// atomic: it writes `last known count + 1` as an absolute value. Two
/// clients incrementing from the same stale base both write the same
/// result and one increment is silently lost. That behavior is part of the
/// counter contract here and is pinned by tests; replacing it with a
/// transactional increment is a deliberate contract change.
pub struct ReactionSync {
    store: Arc<dyn RealtimeStore>,
    last_seen: Arc<Mutex<HashMap<ReviewId, ReactionMap>>>,
}

impl ReactionSync {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self {
            store,
            last_seen: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record one reaction: write `last known count + 1` for the emoji.
    ///
    /// The base count comes from this client's latest observation (via an
    /// active subscription or its own previous increment), defaulting to 0
    /// for an unseen emoji.
    pub async fn increment(&self, review_id: ReviewId, emoji: &str) -> Result<(), StoreError> {
        let base = {
            let last_seen = self.last_seen.lock().unwrap();
            last_seen
                .get(&review_id)
                .and_then(|counts| counts.get(emoji))
                .copied()
                .unwrap_or(0)
        };

        let path = format!("{}/{}/{}", REACTIONS_PATH, review_id, emoji);
        self.store.write(&path, json!(base + 1)).await?;

        // The write is now the latest known writer-side value.
        self.last_seen
            .lock()
            .unwrap()
            .entry(review_id)
            .or_default()
            .insert(emoji.to_string(), base + 1);

        tracing::debug!(review_id = %review_id, emoji = %emoji, count = base + 1, "reaction recorded");
        Ok(())
    }

    /// Subscribe to the counter map of one review. The current map is
    /// delivered immediately, then again after every change; deliveries
    /// also refresh the base counts `increment` reads.
    pub fn subscribe<F>(&self, review_id: ReviewId, mut on_map: F) -> ReactionSubscription
    where
        F: FnMut(&ReactionMap) + Send + 'static,
    {
        let last_seen = self.last_seen.clone();
        let path = format!("{}/{}", REACTIONS_PATH, review_id);

        let inner = self.store.subscribe(
            &path,
            Box::new(move |snapshot| {
                let map = decode_counts(&snapshot);
                last_seen.lock().unwrap().insert(review_id, map.clone());
                on_map(&map);
            }),
        );

        ReactionSubscription { inner }
    }
}

/// Decode a counter snapshot. Entries that are not non-negative integers
/// are skipped.
fn decode_counts(snapshot: &JsonValue) -> ReactionMap {
    let Some(entries) = snapshot.as_object() else {
        return ReactionMap::new();
    };

    entries
        .iter()
        .filter_map(|(emoji, value)| value.as_u64().map(|count| (emoji.clone(), count)))
        .collect()
}

/// Cancellation handle for a reaction subscription. Idempotent; dropping
/// the handle unsubscribes too.
pub struct ReactionSubscription {
    inner: StoreSubscription,
}

impl ReactionSubscription {
    pub fn unsubscribe(&self) {
        self.inner.unsubscribe();
    }
}
