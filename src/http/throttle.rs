//! Client-side request throttle
//!
//! A fast scroll can hit the end of the list, fire a load-more and its
//! prefetch, then a pull to refresh, all within a few hundred milliseconds.
//! The throttle lets a short burst of page requests through and spaces out
//! the rest so the bars endpoint sees a steady rate.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Page request budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Sustained page requests per second
    pub per_second: u32,
    /// Page requests allowed back to back before spacing kicks in
    pub burst: u32,
}

impl Default for ThrottleConfig {
    /// One scroll burst: a load-more, its prefetch and a refresh.
    fn default() -> Self {
        Self {
            per_second: 2,
            burst: 3,
        }
    }
}

impl ThrottleConfig {
    pub fn new(per_second: u32, burst: u32) -> Self {
        Self { per_second, burst }
    }

    fn quota(&self) -> Quota {
        let per_second = NonZeroU32::new(self.per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(per_second).allow_burst(burst)
    }
}

/// Shared gate every page request passes before it is sent.
///
/// Clones share one bucket, so the loader's concurrent fetches draw from the
/// same budget.
#[derive(Clone)]
pub struct RequestThrottle {
    bucket: Arc<DirectLimiter>,
}

impl RequestThrottle {
    /// Zero rates are treated as one.
    pub fn new(config: &ThrottleConfig) -> Self {
        Self {
            bucket: Arc::new(RateLimiter::direct(config.quota())),
        }
    }

    /// Wait for the next page request slot
    pub async fn admit(&self) {
        self.bucket.until_ready().await;
    }

    /// Take a slot if one is free right now
    pub fn try_admit(&self) -> bool {
        self.bucket.check().is_ok()
    }
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle").finish_non_exhaustive()
    }
}
