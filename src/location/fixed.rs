//! Location provider for hosts without location services

use super::types::{LocationProvider, PermissionStatus};
use crate::error::{Error, Result};
use crate::types::Coordinates;
use async_trait::async_trait;

/// Always-granted provider reporting a fixed position, or no position at all
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocationProvider {
    position: Option<Coordinates>,
}

impl FixedLocationProvider {
    /// Report `position` on every read
    pub fn new(position: Coordinates) -> Self {
        Self {
            position: Some(position),
        }
    }

    /// Fail every read, so callers fall back
    pub fn unavailable() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn permission_status(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn current_position(&self) -> Result<Coordinates> {
        self.position
            .ok_or_else(|| Error::location_unavailable("no position configured"))
    }
}
