//! Live, append-aware view of the shared review feed.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::FEED_PATH;
use crate::realtime::{RealtimeStore, StoreSubscription};
use crate::types::{Review, ReviewDraft, ReviewId};

/// Maintains each viewer's ordered local view of the feed.
///
/// The backing store redelivers whole snapshots, not item diffs. Each
/// delivery is decoded chronologically, reversed so the batch reads
/// newest-first, stripped of already-seen reviews, and prepended to the
/// accumulated view; the callback receives the full updated view every
/// time (the first delivery is the full current feed).
pub struct FeedSync {
    store: Arc<dyn RealtimeStore>,
}

impl FeedSync {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    /// Subscribe to feed updates. The subscription stops delivering the
    /// moment [`FeedSubscription::unsubscribe`] returns.
    pub fn subscribe<F>(&self, mut on_update: F) -> FeedSubscription
    where
        F: FnMut(&[Review]) + Send + 'static,
    {
        let mut seen: HashSet<ReviewId> = HashSet::new();
        let mut view: Vec<Review> = Vec::new();

        let inner = self.store.subscribe(
            FEED_PATH,
            Box::new(move |snapshot| {
                let batch = decode_snapshot(&snapshot);

                let mut fresh: Vec<Review> = batch
                    .into_iter()
                    .filter(|review| !seen.contains(&review.id))
                    .collect();
                fresh.reverse();

                for review in &fresh {
                    seen.insert(review.id);
                }
                view.splice(0..0, fresh);

                on_update(&view);
            }),
        );

        FeedSubscription { inner }
    }
}

/// Decode a feed snapshot into reviews ordered chronologically (oldest
/// first). Records that fail to decode are logged and skipped; they never
/// surface as partial reviews.
fn decode_snapshot(snapshot: &JsonValue) -> Vec<Review> {
    let Some(entries) = snapshot.as_object() else {
        return Vec::new();
    };

    let mut reviews: Vec<Review> = entries
        .iter()
        .filter_map(|(key, value)| {
            let Some(id) = ReviewId::parse_key(key) else {
                tracing::warn!(key = %key, "feed entry with non-temporal key skipped");
                return None;
            };
            match serde_json::from_value::<ReviewDraft>(value.clone()) {
                Ok(record) => Some(Review::from_record(id, record)),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "undecodable feed record skipped");
                    None
                }
            }
        })
        .collect();

    reviews.sort_by_key(|review| review.id);
    reviews
}

/// Cancellation handle for a feed subscription. Idempotent; dropping the
/// handle unsubscribes too.
pub struct FeedSubscription {
    inner: StoreSubscription,
}

impl FeedSubscription {
    pub fn unsubscribe(&self) {
        self.inner.unsubscribe();
    }
}
