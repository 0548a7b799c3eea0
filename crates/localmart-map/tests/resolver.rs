//! Geolocation resolution and listener lifecycle.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{coord, FakeGateway};
use localmart_core::{Coordinate, LocationError};
use localmart_map::resolver::{FALLBACK_ZOOM, LOCATED_MAX_ZOOM};
use localmart_map::{GeolocationResolver, LocationSource};

#[tokio::test]
async fn successful_fix_is_resolved_at_max_zoom() {
    let gateway = Arc::new(FakeGateway::new().with_position(coord(40.0, -75.0)));
    let resolver = GeolocationResolver::new(gateway, Duration::from_secs(1));

    let resolution = resolver.resolve().await;

    assert_eq!(resolution.coordinate, coord(40.0, -75.0));
    assert_eq!(resolution.zoom, LOCATED_MAX_ZOOM);
    assert_eq!(resolution.source, LocationSource::Resolved);
}

#[tokio::test]
async fn permission_denied_falls_back_to_default() {
    let gateway =
        Arc::new(FakeGateway::new().with_position_error(LocationError::PermissionDenied));
    let resolver = GeolocationResolver::new(gateway, Duration::from_secs(1));

    let resolution = resolver.resolve().await;

    assert_eq!(resolution.coordinate, Coordinate::FALLBACK);
    assert_eq!(resolution.zoom, FALLBACK_ZOOM);
    assert_eq!(resolution.source, LocationSource::Defaulted);
}

#[tokio::test]
async fn slow_fix_times_out_to_default() {
    let gateway = Arc::new(
        FakeGateway::new()
            .with_position(coord(40.0, -75.0))
            .with_position_delay(Duration::from_secs(5)),
    );
    let resolver = GeolocationResolver::new(gateway, Duration::from_millis(20));

    let resolution = resolver.resolve().await;

    assert_eq!(resolution.source, LocationSource::Defaulted);
    assert_eq!(resolution.coordinate, Coordinate::FALLBACK);
}

#[tokio::test]
async fn subscribe_is_idempotent_and_release_unregisters() {
    let gateway = Arc::new(FakeGateway::new().with_location_events());
    let mut resolver = GeolocationResolver::new(Arc::clone(&gateway), Duration::from_secs(1));

    assert!(resolver.subscribe());
    assert!(!resolver.subscribe());
    assert_eq!(gateway.listener_count(), 1);

    resolver.release();
    assert!(!resolver.is_subscribed());
    assert_eq!(gateway.listener_count(), 0);
}

#[tokio::test]
async fn gateway_without_events_never_subscribes() {
    let gateway = Arc::new(FakeGateway::new());
    let mut resolver = GeolocationResolver::new(gateway, Duration::from_secs(1));

    assert!(!resolver.subscribe());
    assert_eq!(resolver.next_position().await, None);
}

#[tokio::test]
async fn queued_positions_coalesce_to_latest() {
    let gateway = Arc::new(FakeGateway::new().with_location_events());
    let mut resolver = GeolocationResolver::new(Arc::clone(&gateway), Duration::from_secs(1));
    resolver.subscribe();

    gateway.move_to(coord(41.0, -74.0));
    gateway.move_to(coord(42.0, -73.0));

    assert_eq!(resolver.next_position().await, Some(coord(42.0, -73.0)));
}
