//! Short-TTL cache for the global feed.
//!
//! One slot, time-based expiry only. Writes never evict: a post created or
//! deleted inside the window keeps the cached feed as-is until the TTL
//! elapses, which consumers of the global feed accept as a staleness window.
//! The cached sequence is shared immutably (`Arc<[_]>`), so a hit cannot be
//! corrupted by its reader.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use metrics::counter;

use crate::domain::entities::PostRecord;

use super::clock::Clock;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::feed";

pub const DEFAULT_FEED_TTL: Duration = Duration::from_secs(20);

struct CachedFeed {
    posts: Arc<[PostRecord]>,
    expires_at: Instant,
}

pub struct FeedCache {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    slot: RwLock<Option<CachedFeed>>,
}

impl FeedCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            ttl,
            slot: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached feed while it is present and unexpired.
    ///
    /// A concurrent `get` between expiry and the next `set` may cause one
    /// extra recompute in the caller; that race is deliberately not
    /// serialized.
    pub fn get(&self) -> Option<Arc<[PostRecord]>> {
        let guard = rw_read(&self.slot, SOURCE, "get");
        match guard.as_ref() {
            Some(entry) if self.clock.now() < entry.expires_at => {
                counter!("brusio_feed_cache_hit_total").increment(1);
                Some(Arc::clone(&entry.posts))
            }
            _ => {
                counter!("brusio_feed_cache_miss_total").increment(1);
                None
            }
        }
    }

    /// Store a freshly materialized feed, opening a new TTL window.
    pub fn set(&self, posts: Arc<[PostRecord]>) {
        let expires_at = self.clock.now() + self.ttl;
        let mut guard = rw_write(&self.slot, SOURCE, "set");
        *guard = Some(CachedFeed { posts, expires_at });
    }
}
