//! Location types and the platform seam

use crate::error::Result;
use crate::types::Coordinates;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// How long a device fix is reused before asking the platform again
pub const LOCATION_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Location permission as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// The user has not been asked yet
    Undetermined,
    /// Access granted
    Granted,
    /// Access denied. `can_ask_again` is false once the platform stops showing
    /// the prompt.
    Denied { can_ask_again: bool },
}

impl PermissionStatus {
    /// Whether a permission prompt may still be shown
    pub fn is_askable(self) -> bool {
        matches!(
            self,
            PermissionStatus::Undetermined | PermissionStatus::Denied { can_ask_again: true }
        )
    }
}

/// Platform location services
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Current permission without prompting
    async fn permission_status(&self) -> PermissionStatus;

    /// Prompt the user for permission
    async fn request_permission(&self) -> PermissionStatus;

    /// Read the device position
    async fn current_position(&self) -> Result<Coordinates>;
}

/// A device fix and when it was taken
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedLocation {
    /// Position
    pub coordinates: Coordinates,
    /// When the position was read
    pub captured_at: Instant,
}

impl CachedLocation {
    /// Stamp a position with the current time
    pub fn now(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            captured_at: Instant::now(),
        }
    }

    /// Whether the fix is younger than `ttl`
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.captured_at.elapsed() < ttl
    }
}
