//! Tests for the location module

use super::*;
use crate::error::Error;
use crate::types::{Coordinates, DEFAULT_COORDINATES};
use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct FakeProvider {
    status: Mutex<PermissionStatus>,
    on_request: Mutex<PermissionStatus>,
    position: Mutex<Option<Coordinates>>,
    status_calls: AtomicUsize,
    request_calls: AtomicUsize,
    position_calls: AtomicUsize,
}

impl FakeProvider {
    fn new(status: PermissionStatus, on_request: PermissionStatus) -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(status),
            on_request: Mutex::new(on_request),
            position: Mutex::new(Some(Coordinates::new(51.5074, -0.1278))),
            status_calls: AtomicUsize::new(0),
            request_calls: AtomicUsize::new(0),
            position_calls: AtomicUsize::new(0),
        })
    }

    fn granted() -> Arc<Self> {
        Self::new(PermissionStatus::Granted, PermissionStatus::Granted)
    }

    fn set_position(&self, position: Option<Coordinates>) {
        *self.position.lock() = position;
    }
}

#[async_trait]
impl LocationProvider for FakeProvider {
    async fn permission_status(&self) -> PermissionStatus {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        *self.status.lock()
    }

    async fn request_permission(&self) -> PermissionStatus {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        let result = *self.on_request.lock();
        *self.status.lock() = result;
        result
    }

    async fn current_position(&self) -> crate::Result<Coordinates> {
        self.position_calls.fetch_add(1, Ordering::SeqCst);
        (*self.position.lock()).ok_or_else(|| Error::location_unavailable("no fix"))
    }
}

#[test]
fn test_permission_askable() {
    assert!(PermissionStatus::Undetermined.is_askable());
    assert!(PermissionStatus::Denied {
        can_ask_again: true
    }
    .is_askable());
    assert!(!PermissionStatus::Denied {
        can_ask_again: false
    }
    .is_askable());
    assert!(!PermissionStatus::Granted.is_askable());
}

#[tokio::test(start_paused = true)]
async fn test_refresh_publishes_coordinates() {
    let provider = FakeProvider::granted();
    let cache = LocationCache::new(provider.clone());
    let mut rx = cache.subscribe();
    assert_eq!(*rx.borrow(), None);

    let coords = cache.refresh().await.unwrap();
    assert_eq!(coords, Coordinates::new(51.5074, -0.1278));
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), Some(coords));
    assert_eq!(cache.last_known(), Some(coords));
    assert!(cache.is_permission_granted());
}

#[tokio::test(start_paused = true)]
async fn test_fresh_fix_is_reused() {
    let provider = FakeProvider::granted();
    let cache = LocationCache::new(provider.clone());

    cache.current_coordinates().await;
    tokio::time::advance(Duration::from_secs(299)).await;
    cache.current_coordinates().await;
    assert_eq!(provider.position_calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(1)).await;
    cache.current_coordinates().await;
    assert_eq!(provider.position_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_granted_permission_is_sticky() {
    let provider = FakeProvider::granted();
    let cache = LocationCache::new(provider.clone()).with_ttl(Duration::ZERO);

    cache.refresh().await.unwrap();
    cache.refresh().await.unwrap();
    cache.refresh().await.unwrap();

    assert_eq!(provider.status_calls.load(Ordering::SeqCst), 1);
    assert_eq!(provider.request_calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.position_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_undetermined_prompts_once_and_grants() {
    let provider = FakeProvider::new(PermissionStatus::Undetermined, PermissionStatus::Granted);
    let cache = LocationCache::new(provider.clone());

    cache.refresh().await.unwrap();
    assert_eq!(provider.request_calls.load(Ordering::SeqCst), 1);
    assert!(cache.is_permission_granted());
}

#[tokio::test(start_paused = true)]
async fn test_permanent_denial_falls_back_to_default() {
    let provider = FakeProvider::new(
        PermissionStatus::Denied {
            can_ask_again: false,
        },
        PermissionStatus::Granted,
    );
    let cache = LocationCache::new(provider.clone());

    let err = cache.refresh().await.unwrap_err();
    assert!(matches!(err, Error::LocationPermission { permanent: true }));
    assert!(cache.is_permanently_denied());
    assert_eq!(provider.request_calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.position_calls.load(Ordering::SeqCst), 0);

    assert_eq!(cache.current_coordinates().await, DEFAULT_COORDINATES);
}

#[tokio::test(start_paused = true)]
async fn test_soft_denial_can_be_asked_again() {
    let provider = FakeProvider::new(
        PermissionStatus::Undetermined,
        PermissionStatus::Denied {
            can_ask_again: true,
        },
    );
    let cache = LocationCache::new(provider.clone());

    let err = cache.refresh().await.unwrap_err();
    assert!(matches!(err, Error::LocationPermission { permanent: false }));
    assert!(!cache.is_permanently_denied());

    *provider.on_request.lock() = PermissionStatus::Granted;
    cache.refresh().await.unwrap();
    assert_eq!(provider.request_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_read_uses_last_known() {
    let provider = FakeProvider::granted();
    let fallback = Coordinates::new(1.0, 2.0);
    let cache = LocationCache::new(provider.clone()).with_fallback(fallback);

    let first = cache.current_coordinates().await;
    provider.set_position(None);
    tokio::time::advance(LOCATION_CACHE_TTL).await;

    assert_eq!(cache.current_coordinates().await, first);
}

#[tokio::test(start_paused = true)]
async fn test_failed_read_without_history_uses_fallback() {
    let provider = FakeProvider::granted();
    provider.set_position(None);
    let fallback = Coordinates::new(1.0, 2.0);
    let cache = LocationCache::new(provider).with_fallback(fallback);

    assert_eq!(cache.current_coordinates().await, fallback);
    assert_eq!(cache.last_known(), None);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_position_is_rejected() {
    let provider = FakeProvider::granted();
    provider.set_position(Some(Coordinates::new(123.0, 0.0)));
    let cache = LocationCache::new(provider);

    let err = cache.refresh().await.unwrap_err();
    assert!(matches!(err, Error::LocationUnavailable { .. }));
    assert!(cache.cached().is_none());
}

#[tokio::test]
async fn test_fixed_provider() {
    let here = Coordinates::new(51.5074, -0.1278);
    let cache = LocationCache::new(Arc::new(FixedLocationProvider::new(here)));
    assert_eq!(cache.current_coordinates().await, here);
    assert!(cache.is_permission_granted());

    let fallback = Coordinates::new(1.0, 2.0);
    let cache = LocationCache::new(Arc::new(FixedLocationProvider::unavailable())).with_fallback(fallback);
    assert_eq!(cache.current_coordinates().await, fallback);
}
