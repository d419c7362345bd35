//! Integration tests for tags, text search and proximity.

#![allow(clippy::unwrap_used)]

use storefinder_catalog::services::locator::NearQuery;
use storefinder_catalog::validation::StoreInput;
use storefinder_catalog::CatalogSettings;
use storefinder_core::GeoPoint;
use storefinder_integration_tests::{catalog, catalog_with, create_tagged, register, store_input};

// =============================================================================
// Tags
// =============================================================================

#[tokio::test]
async fn test_list_tags_counts_and_orders() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    create_tagged(&catalog, &wes, "A", &["Wifi", "Open Late"]).await;
    create_tagged(&catalog, &wes, "B", &["Wifi", "Licensed"]).await;
    create_tagged(&catalog, &wes, "C", &["Wifi", "Family Friendly"]).await;
    create_tagged(&catalog, &wes, "D", &[]).await;

    let tags = catalog.list_tags().await.unwrap();
    let pairs: Vec<(&str, usize)> = tags.iter().map(|t| (t.tag.as_str(), t.count)).collect();
    assert_eq!(
        pairs,
        [
            ("Wifi", 3),
            ("Family Friendly", 1),
            ("Licensed", 1),
            ("Open Late", 1),
        ]
    );
}

#[tokio::test]
async fn test_list_by_tag() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    create_tagged(&catalog, &wes, "A", &["Wifi"]).await;
    create_tagged(&catalog, &wes, "B", &["Licensed"]).await;
    create_tagged(&catalog, &wes, "C", &[]).await;

    let listing = catalog.list_by_tag(Some("Wifi")).await.unwrap();
    assert_eq!(listing.active_tag.as_deref(), Some("Wifi"));
    let names: Vec<&str> = listing.stores.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["A"]);

    // No tag: every store that has at least one tag
    let listing = catalog.list_by_tag(None).await.unwrap();
    assert_eq!(listing.active_tag, None);
    assert_eq!(listing.stores.len(), 2);
    assert_eq!(listing.tags.len(), 2);

    // Tags match exactly
    assert!(catalog.list_by_tag(Some("wifi")).await.unwrap().stores.is_empty());
}

#[tokio::test]
async fn test_list_by_tag_trims_requested_tag() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    create_tagged(&catalog, &wes, "A", &["Wifi"]).await;
    create_tagged(&catalog, &wes, "B", &["Licensed"]).await;

    let listing = catalog.list_by_tag(Some(" Wifi ")).await.unwrap();
    assert_eq!(listing.active_tag.as_deref(), Some("Wifi"));
    assert_eq!(listing.stores.len(), 1);
    assert_eq!(listing.stores[0].name, "A");

    let listing = catalog.list_by_tag(Some("   ")).await.unwrap();
    assert_eq!(listing.active_tag, None);
    assert_eq!(listing.stores.len(), 2);
}

// =============================================================================
// Text Search
// =============================================================================

#[tokio::test]
async fn test_search_text_returns_top_five() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    for i in 0..7 {
        let input = StoreInput {
            description: "Fresh coffee every morning".to_owned(),
            ..store_input(&format!("Shop {i}"), 0.0, 0.0)
        };
        catalog.create_store(wes.id, &input).await.unwrap();
    }
    let input = StoreInput {
        description: "Coffee, coffee and more coffee".to_owned(),
        ..store_input("Coffee Coffee", 0.0, 0.0)
    };
    catalog.create_store(wes.id, &input).await.unwrap();

    let results = catalog.search_text("coffee").await.unwrap();
    assert_eq!(results.len(), 5);
    assert_eq!(results[0].name, "Coffee Coffee");
}

#[tokio::test]
async fn test_search_text_empty_query() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    create_tagged(&catalog, &wes, "Anything", &[]).await;

    assert!(catalog.search_text("").await.unwrap().is_empty());
    assert!(catalog.search_text("   ").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_follows_updates() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    let store = create_tagged(&catalog, &wes, "Tea House", &[]).await;
    assert_eq!(catalog.search_text("tea").await.unwrap().len(), 1);

    catalog
        .update_store(store.id, wes.id, &store_input("Juice Bar", 0.0, 0.0))
        .await
        .unwrap();

    assert!(catalog.search_text("tea").await.unwrap().is_empty());
    let hits = catalog.search_text("juice").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].slug.as_str(), "juice-bar");
}

#[tokio::test]
async fn test_reindex_counts_stores() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    create_tagged(&catalog, &wes, "One", &[]).await;
    create_tagged(&catalog, &wes, "Two", &[]).await;

    assert_eq!(catalog.reindex_search().await.unwrap(), 2);
    assert_eq!(catalog.search_text("two").await.unwrap().len(), 1);
}

// =============================================================================
// Proximity
// =============================================================================

#[tokio::test]
async fn test_near_missing_coordinates_is_empty() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    create_tagged(&catalog, &wes, "Here", &[]).await;

    let missing_lat = NearQuery {
        lng: Some("0".to_owned()),
        ..NearQuery::default()
    };
    assert!(catalog.near(&missing_lat).await.unwrap().is_empty());

    let missing_lng = NearQuery {
        lat: Some("0".to_owned()),
        ..NearQuery::default()
    };
    assert!(catalog.near(&missing_lng).await.unwrap().is_empty());

    let garbage = NearQuery {
        lng: Some("east".to_owned()),
        lat: Some("NaN".to_owned()),
        max_distance_meters: None,
    };
    assert!(catalog.near(&garbage).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_near_sorted_and_within_radius() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    // Roughly 0, 5.5, 11, 22 and 55 km east of the origin along the equator
    for (name, lng) in [
        ("Far", 0.5),
        ("Mid", 0.1),
        ("Origin", 0.0),
        ("Edge", 0.2),
        ("Near", 0.05),
    ] {
        catalog
            .create_store(wes.id, &store_input(name, lng, 0.0))
            .await
            .unwrap();
    }

    let origin = GeoPoint::new(0.0, 0.0).unwrap();
    let results = catalog.near(&NearQuery::at(0.0, 0.0)).await.unwrap();
    let names: Vec<&str> = results.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Origin", "Near", "Mid", "Edge"]);

    let distances: Vec<f64> = results
        .iter()
        .map(|s| origin.distance_meters(&s.location.coordinates))
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    assert!(distances.iter().all(|d| *d < 30_000.0));
}

#[tokio::test]
async fn test_near_custom_radius_and_limit() {
    let settings = CatalogSettings {
        near_limit: 2,
        ..CatalogSettings::default()
    };
    let catalog = catalog_with(settings).await;
    let wes = register(&catalog, "Wes").await;
    for (name, lng) in [("A", 0.0), ("B", 0.01), ("C", 0.02)] {
        catalog
            .create_store(wes.id, &store_input(name, lng, 0.0))
            .await
            .unwrap();
    }

    assert_eq!(catalog.near(&NearQuery::at(0.0, 0.0)).await.unwrap().len(), 2);

    let tight = NearQuery::at(0.0, 0.0).within(500.0);
    let names: Vec<String> = catalog
        .near(&tight)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, ["A"]);
}

#[tokio::test]
async fn test_near_projection_json() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    create_tagged(&catalog, &wes, "Cool Cafe", &["Wifi"]).await;

    let results = catalog.near(&NearQuery::at(0.0, 0.0)).await.unwrap();
    let json = serde_json::to_value(&results).unwrap();
    let first = &json[0];
    assert_eq!(first["slug"], "cool-cafe");
    assert_eq!(first["location"]["coordinates"], serde_json::json!([0.0, 0.0]));
    assert!(first.get("tags").is_none());
    assert!(first.get("author").is_none());
}
