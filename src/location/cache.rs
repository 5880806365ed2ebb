//! Cached device location with permission handling

use super::types::{CachedLocation, LocationProvider, PermissionStatus, LOCATION_CACHE_TTL};
use crate::error::{Error, Result};
use crate::types::{Coordinates, DEFAULT_COORDINATES};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct LocationInner {
    /// Sticky once observed
    permission_granted: bool,
    permanently_denied: bool,
    cached: Option<CachedLocation>,
    last_known: Option<Coordinates>,
}

/// Last known device location, refreshed on demand.
///
/// Once permission has been granted it is never checked again for the life of
/// the cache. Observers can follow the latest fix through [`subscribe`].
///
/// [`subscribe`]: LocationCache::subscribe
pub struct LocationCache {
    provider: Arc<dyn LocationProvider>,
    ttl: Duration,
    fallback: Coordinates,
    inner: Mutex<LocationInner>,
    current: watch::Sender<Option<Coordinates>>,
}

impl LocationCache {
    /// Create a cache over a platform provider with default settings
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            provider,
            ttl: LOCATION_CACHE_TTL,
            fallback: DEFAULT_COORDINATES,
            inner: Mutex::new(LocationInner::default()),
            current,
        }
    }

    /// Set how long a fix is reused
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the coordinate used when no fix was ever obtained
    #[must_use]
    pub fn with_fallback(mut self, fallback: Coordinates) -> Self {
        self.fallback = fallback;
        self
    }

    /// Follow the latest known coordinates
    pub fn subscribe(&self) -> watch::Receiver<Option<Coordinates>> {
        self.current.subscribe()
    }

    /// Last successfully read coordinates
    pub fn last_known(&self) -> Option<Coordinates> {
        self.inner.lock().last_known
    }

    /// The cached fix, fresh or not
    pub fn cached(&self) -> Option<CachedLocation> {
        self.inner.lock().cached
    }

    /// Whether the platform will no longer show the permission prompt
    pub fn is_permanently_denied(&self) -> bool {
        self.inner.lock().permanently_denied
    }

    /// Whether permission has been granted at some point
    pub fn is_permission_granted(&self) -> bool {
        self.inner.lock().permission_granted
    }

    /// Coordinates to use right now. Never fails.
    ///
    /// Returns the cached fix while it is fresh, otherwise reads the device.
    /// If that fails, falls back to the last known fix and then to the
    /// configured default.
    pub async fn current_coordinates(&self) -> Coordinates {
        let fresh = self
            .inner
            .lock()
            .cached
            .filter(|c| c.is_fresh(self.ttl))
            .map(|c| c.coordinates);
        if let Some(coordinates) = fresh {
            return coordinates;
        }

        match self.refresh().await {
            Ok(coordinates) => coordinates,
            Err(e) => {
                let last_known = self.last_known();
                warn!(error = %e, has_last_known = last_known.is_some(), "Location refresh failed");
                last_known.unwrap_or(self.fallback)
            }
        }
    }

    /// Read the device position now, ignoring the cache
    pub async fn refresh(&self) -> Result<Coordinates> {
        self.ensure_permission().await?;

        let coordinates = self.provider.current_position().await?;
        if !coordinates.is_valid() {
            return Err(Error::location_unavailable(format!(
                "device reported invalid position {coordinates}"
            )));
        }

        {
            let mut inner = self.inner.lock();
            inner.cached = Some(CachedLocation::now(coordinates));
            inner.last_known = Some(coordinates);
        }
        self.current.send_replace(Some(coordinates));

        debug!(%coordinates, "Location updated");
        Ok(coordinates)
    }

    /// Make sure location access is granted, prompting at most once
    pub async fn ensure_permission(&self) -> Result<()> {
        if self.inner.lock().permission_granted {
            return Ok(());
        }

        let mut status = self.provider.permission_status().await;
        if status.is_askable() {
            status = self.provider.request_permission().await;
        }

        let mut inner = self.inner.lock();
        match status {
            PermissionStatus::Granted => {
                inner.permission_granted = true;
                inner.permanently_denied = false;
                info!("Location permission granted");
                Ok(())
            }
            PermissionStatus::Denied {
                can_ask_again: false,
            } => {
                inner.permanently_denied = true;
                Err(Error::LocationPermission { permanent: true })
            }
            PermissionStatus::Denied {
                can_ask_again: true,
            }
            | PermissionStatus::Undetermined => Err(Error::LocationPermission { permanent: false }),
        }
    }
}

impl std::fmt::Debug for LocationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationCache")
            .field("ttl", &self.ttl)
            .field("fallback", &self.fallback)
            .field("inner", &*self.inner.lock())
            .finish_non_exhaustive()
    }
}
