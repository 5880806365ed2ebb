//! Loader types

use crate::pagination::LoadMode;
use crate::types::Coordinates;
use std::fmt;

/// Per-call overrides for [`PageLoader::load_page`](super::PageLoader::load_page)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadOptions {
    /// Skip the cache lookup
    pub ignore_cache: bool,
    /// Use these coordinates instead of the resolved ones
    pub coordinates: Option<Coordinates>,
}

impl LoadOptions {
    /// Options that bypass the cache
    pub fn ignore_cache() -> Self {
        Self {
            ignore_cache: true,
            coordinates: None,
        }
    }

    /// Pin the request to specific coordinates
    #[must_use]
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }
}

/// A load deferred because the concurrency budget was exhausted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingRequest {
    pub page: u32,
    pub mode: LoadMode,
    pub options: LoadOptions,
}

/// What a call to `load_page` ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Served from the cache, no request issued
    CacheHit,
    /// The page was already being fetched
    AlreadyInFlight,
    /// Budget exhausted; stored in the queue slot
    Queued,
    /// Fetched and merged
    Loaded { received: usize, has_more: bool },
    /// Cancelled by refresh, retry or shutdown; state untouched
    Cancelled,
    /// Fetch failed; the message is in the state's `error`
    Failed { message: String },
    /// Nothing to do (load-more preconditions not met, or the loader is shut down)
    Skipped,
}

impl LoadOutcome {
    /// Whether a network response was merged
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

impl fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadOutcome::CacheHit => write!(f, "cache hit"),
            LoadOutcome::AlreadyInFlight => write!(f, "already in flight"),
            LoadOutcome::Queued => write!(f, "queued"),
            LoadOutcome::Loaded { received, has_more } => {
                write!(f, "loaded {received} items (has_more: {has_more})")
            }
            LoadOutcome::Cancelled => write!(f, "cancelled"),
            LoadOutcome::Failed { message } => write!(f, "failed: {message}"),
            LoadOutcome::Skipped => write!(f, "skipped"),
        }
    }
}
