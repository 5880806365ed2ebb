//! Device location module
//!
//! Wraps platform location services behind [`LocationProvider`] and keeps the
//! last fix in a [`LocationCache`] with a five minute lifetime.
//!
//! # Permission states
//!
//! ```text
//! Undetermined ──► Granted (sticky)
//!      │
//!      ├──► Denied { can_ask_again: true }   (prompt again next refresh)
//!      └──► Denied { can_ask_again: false }  (never prompt, never read)
//! ```

mod cache;
mod fixed;
mod types;

pub use cache::LocationCache;
pub use fixed::FixedLocationProvider;
pub use types::{CachedLocation, LocationProvider, PermissionStatus, LOCATION_CACHE_TTL};

#[cfg(test)]
mod tests;
