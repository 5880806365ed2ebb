//! Single-slot page cache
//!
//! Holds the merged list for exactly one (coordinates, tags) key. Storing a
//! record under a different key evicts the previous one.

use crate::types::Coordinates;
use std::time::Duration;
use tokio::time::Instant;

/// Default cache lifetime
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Cache key for a location and tag selection.
///
/// Coordinates are rounded to four decimals (about 11 m) so GPS jitter does
/// not change the key. `sorted_tags` must already be sorted.
pub fn cache_key(coordinates: &Coordinates, sorted_tags: &[String]) -> String {
    format!(
        "{:.4},{:.4}|{}",
        coordinates.lat,
        coordinates.lon,
        sorted_tags.join(",")
    )
}

/// A cached list snapshot
#[derive(Debug, Clone)]
pub struct CacheRecord<E> {
    /// Key the record was stored under
    pub key: String,
    /// When the record was written
    pub timestamp: Instant,
    /// Merged list at the time of writing
    pub data: Vec<E>,
    /// Highest page included in `data`
    pub current_page: u32,
    /// Whether more pages were believed to exist
    pub has_more: bool,
    /// Server-reported total
    pub total_count: Option<u64>,
}

/// Cache with room for one record
#[derive(Debug)]
pub struct PageCache<E> {
    slot: Option<CacheRecord<E>>,
    timeout: Duration,
}

impl<E> PageCache<E> {
    /// Create an empty cache with the given lifetime
    pub fn new(timeout: Duration) -> Self {
        Self {
            slot: None,
            timeout,
        }
    }

    /// Record usable for `key` and `page`: same key, younger than the
    /// timeout, and covering `page`
    pub fn lookup(&self, key: &str, page: u32) -> Option<&CacheRecord<E>> {
        self.slot
            .as_ref()
            .filter(|r| r.key == key && self.is_fresh(r) && page <= r.current_page)
    }

    /// Store a record, replacing whatever was cached
    pub fn store(&mut self, record: CacheRecord<E>) {
        self.slot = Some(record);
    }

    /// Drop the cached record
    pub fn clear(&mut self) {
        self.slot = None;
    }

    /// The cached record, fresh or not
    pub fn record(&self) -> Option<&CacheRecord<E>> {
        self.slot.as_ref()
    }

    /// Cache lifetime
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn is_fresh(&self, record: &CacheRecord<E>) -> bool {
        record.timestamp.elapsed() < self.timeout
    }
}
