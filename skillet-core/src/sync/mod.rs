//! Shared-feed persistence and live synchronization.
//!
//! [`ReviewStore`] writes completed reviews under time-ordered keys;
//! [`FeedSync`] maintains each viewer's newest-first view of the feed;
//! [`ReactionSync`] applies and observes per-review emoji counters.

mod feed;
mod reactions;
mod review_store;

pub use feed::{FeedSubscription, FeedSync};
pub use reactions::{ReactionMap, ReactionSubscription, ReactionSync};
pub use review_store::{ReviewKeys, ReviewStore, FEED_PATH, REACTIONS_PATH};
