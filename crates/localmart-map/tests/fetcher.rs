//! Nearby-entity fetch behavior against a scripted gateway.

mod common;

use std::collections::HashSet;
use std::sync::atomic::Ordering;

use common::{coord, FakeGateway};
use localmart_core::{EntityKind, NearbyQuery, SearchRadius};
use localmart_map::{fetch_nearby, FetchError};
use serde_json::json;

#[tokio::test]
async fn both_queries_receive_center_and_radius() {
    let gateway = FakeGateway::new();
    let center = coord(40.0, -75.0);

    fetch_nearby(&gateway, center, SearchRadius::FIFTY_MILES)
        .await
        .expect("empty answers should succeed");

    assert_eq!(gateway.product_calls.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.workshop_calls.load(Ordering::SeqCst), 1);
    let expected = NearbyQuery::new(center, SearchRadius::FIFTY_MILES);
    let queries = gateway.queries.lock().unwrap().clone();
    assert_eq!(queries, vec![expected, expected]);
}

#[tokio::test]
async fn workshop_failure_discards_products() {
    let gateway = FakeGateway::new()
        .with_products(vec![json!({ "id": "p1", "title": "Jam", "price": 5 })])
        .failing_workshops();

    let result = fetch_nearby(&gateway, coord(40.0, -75.0), SearchRadius::FIFTY_MILES).await;
    assert!(matches!(result, Err(FetchError::Workshops(_))), "got {result:?}");
}

#[tokio::test]
async fn product_failure_discards_workshops() {
    let gateway = FakeGateway::new()
        .failing_products()
        .with_workshops(vec![json!({ "id": "w1", "title": "Knitting", "price": 20 })]);

    let result = fetch_nearby(&gateway, coord(40.0, -75.0), SearchRadius::FIFTY_MILES).await;
    assert!(matches!(result, Err(FetchError::Products(_))), "got {result:?}");
}

#[tokio::test]
async fn both_failing_reports_products_and_awaits_both() {
    let gateway = FakeGateway::new().failing_products().failing_workshops();

    let result = fetch_nearby(&gateway, coord(40.0, -75.0), SearchRadius::FIFTY_MILES).await;
    assert!(matches!(result, Err(FetchError::Products(_))));
    assert_eq!(gateway.workshop_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn same_id_across_kinds_is_kept_once_per_kind() {
    let gateway = FakeGateway::new()
        .with_products(vec![json!({ "id": "7", "title": "Bread", "price": 6 })])
        .with_workshops(vec![json!({ "id": "7", "title": "Baking class", "price": 40 })]);

    let entities = fetch_nearby(&gateway, coord(40.0, -75.0), SearchRadius::FIFTY_MILES)
        .await
        .unwrap();

    assert_eq!(entities.len(), 2);
    let keys: HashSet<_> = entities.iter().map(localmart_core::NearbyEntity::key).collect();
    assert_eq!(keys.len(), 2);
    assert!(entities.iter().any(|e| e.kind() == EntityKind::Product && e.listing().id == "7"));
    assert!(entities.iter().any(|e| e.kind() == EntityKind::Workshop && e.listing().id == "7"));
}

#[tokio::test]
async fn duplicate_id_within_kind_keeps_first() {
    let gateway = FakeGateway::new().with_products(vec![
        json!({ "id": 3, "title": "First", "price": 1 }),
        json!({ "id": "3", "title": "Second", "price": 2 }),
    ]);

    let entities = fetch_nearby(&gateway, coord(40.0, -75.0), SearchRadius::FIFTY_MILES)
        .await
        .unwrap();

    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].listing().title, "First");
}

#[tokio::test]
async fn record_without_coordinates_is_placed_at_center() {
    let center = coord(40.0, -75.0);
    let gateway = FakeGateway::new()
        .with_workshops(vec![json!({ "id": "w9", "title": "Woodcarving", "price": 15 })]);

    let entities = fetch_nearby(&gateway, center, SearchRadius::FIFTY_MILES)
        .await
        .unwrap();

    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].coordinate(), center);
}

#[tokio::test]
async fn malformed_rows_are_skipped_not_fatal() {
    let gateway = FakeGateway::new().with_products(vec![
        json!({ "title": "No id", "price": 1 }),
        json!({ "id": "p2", "title": "Negative", "price": -1 }),
        json!({ "id": "p3", "title": "Fine", "price": "2.50" }),
    ]);

    let entities = fetch_nearby(&gateway, coord(40.0, -75.0), SearchRadius::FIFTY_MILES)
        .await
        .unwrap();

    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].listing().id, "p3");
}

#[tokio::test]
async fn mistyped_title_keeps_every_row() {
    let gateway = FakeGateway::new().with_products(vec![
        json!({ "id": "1", "title": 5, "price": 1 }),
        json!({ "id": "2", "title": "ok", "price": 1 }),
    ]);

    let entities = fetch_nearby(&gateway, coord(40.0, -75.0), SearchRadius::FIFTY_MILES)
        .await
        .unwrap();

    let titles: HashSet<_> = entities
        .iter()
        .map(|e| (e.listing().id.as_str(), e.listing().title.as_str()))
        .collect();
    assert_eq!(titles, HashSet::from([("1", "Untitled"), ("2", "ok")]));
}
