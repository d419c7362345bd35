//! Integration tests for reviews, top stores and store detail.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use storefinder_catalog::services::ranking::MIN_REVIEWS_FOR_RANKING;
use storefinder_catalog::validation::ReviewInput;
use storefinder_catalog::{Catalog, CatalogError, CatalogSettings};
use storefinder_core::{StoreId, UserId};
use storefinder_integration_tests::{catalog, catalog_with, create_tagged, register};

async fn review(catalog: &Catalog, author: UserId, store: StoreId, rating: i64) {
    catalog
        .add_review(
            author,
            store,
            &ReviewInput {
                text: format!("Rated {rating}"),
                rating: Some(rating),
            },
        )
        .await
        .unwrap();
}

// =============================================================================
// Top Stores
// =============================================================================

#[tokio::test]
async fn test_top_stores_requires_two_reviews() {
    assert_eq!(MIN_REVIEWS_FOR_RANKING, 2);

    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    let pair = create_tagged(&catalog, &wes, "Pair", &[]).await;
    let single = create_tagged(&catalog, &wes, "Single", &[]).await;
    create_tagged(&catalog, &wes, "Unreviewed", &[]).await;

    review(&catalog, wes.id, pair.id, 4).await;
    review(&catalog, wes.id, pair.id, 5).await;
    review(&catalog, wes.id, single.id, 5).await;

    let top = catalog.top_stores().await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].name, "Pair");
    assert_eq!(top[0].slug.as_str(), "pair");
    assert_eq!(top[0].reviews.len(), 2);
    assert!((top[0].average_rating - 4.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_top_stores_ordered_by_exact_mean() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;

    let ratings: [(&str, &[i64]); 3] = [
        ("Middling", &[3, 4, 2]),
        ("Best", &[5, 5]),
        ("Good", &[4, 5, 4]),
    ];
    for (name, scores) in ratings {
        let store = create_tagged(&catalog, &wes, name, &[]).await;
        for score in scores {
            review(&catalog, wes.id, store.id, *score).await;
        }
    }

    let top = catalog.top_stores().await.unwrap();
    let names: Vec<&str> = top.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Best", "Good", "Middling"]);

    for entry in &top {
        let sum: f64 = entry.reviews.iter().map(|r| f64::from(r.rating.value())).sum();
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / entry.reviews.len() as f64;
        assert!((entry.average_rating - mean).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_top_stores_limit() {
    let settings = CatalogSettings {
        top_stores_limit: 2,
        ..CatalogSettings::default()
    };
    let catalog = catalog_with(settings).await;
    let wes = register(&catalog, "Wes").await;
    for name in ["A", "B", "C"] {
        let store = create_tagged(&catalog, &wes, name, &[]).await;
        review(&catalog, wes.id, store.id, 3).await;
        review(&catalog, wes.id, store.id, 4).await;
    }

    assert_eq!(catalog.top_stores().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_top_stores_cache_refreshes_on_review() {
    let settings = CatalogSettings {
        top_stores_ttl: Some(Duration::from_secs(3600)),
        ..CatalogSettings::default()
    };
    let catalog = catalog_with(settings).await;
    let wes = register(&catalog, "Wes").await;
    let store = create_tagged(&catalog, &wes, "Cool Cafe", &[]).await;
    review(&catalog, wes.id, store.id, 5).await;

    assert!(catalog.top_stores().await.unwrap().is_empty());

    review(&catalog, wes.id, store.id, 4).await;
    let top = catalog.top_stores().await.unwrap();
    assert_eq!(top.len(), 1);
    assert!((top[0].average_rating - 4.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_top_stores_json_shape() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    let store = create_tagged(&catalog, &wes, "Cool Cafe", &[]).await;
    review(&catalog, wes.id, store.id, 4).await;
    review(&catalog, wes.id, store.id, 5).await;

    let json = serde_json::to_value(catalog.top_stores().await.unwrap()).unwrap();
    assert_eq!(json[0]["averageRating"], 4.5);
    assert_eq!(json[0]["slug"], "cool-cafe");
}

// =============================================================================
// Reviews
// =============================================================================

#[tokio::test]
async fn test_review_validation() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    let store = create_tagged(&catalog, &wes, "Cool Cafe", &[]).await;

    let err = catalog
        .add_review(wes.id, store.id, &ReviewInput::default())
        .await
        .unwrap_err();
    let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, ["text", "rating"]);

    let err = catalog
        .add_review(
            wes.id,
            store.id,
            &ReviewInput {
                text: "Too good".to_owned(),
                rating: Some(6),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));

    let detail = catalog.store_by_slug("cool-cafe").await.unwrap();
    assert!(detail.reviews.is_empty());
}

#[tokio::test]
async fn test_review_for_missing_store() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;

    let err = catalog
        .add_review(
            wes.id,
            StoreId::new(999),
            &ReviewInput {
                text: "Where is it?".to_owned(),
                rating: Some(3),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
}

// =============================================================================
// Store Detail
// =============================================================================

#[tokio::test]
async fn test_store_detail_attaches_authors() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    let debbie = register(&catalog, "Debbie").await;
    let store = create_tagged(&catalog, &wes, "Cool Cafe", &[]).await;
    review(&catalog, debbie.id, store.id, 3).await;
    review(&catalog, wes.id, store.id, 5).await;

    let detail = catalog.store_by_slug("cool-cafe").await.unwrap();
    assert_eq!(detail.store.id, store.id);
    assert_eq!(detail.author.unwrap().name, "Wes");

    let authors: Vec<&str> = detail
        .reviews
        .iter()
        .map(|r| r.author.as_ref().unwrap().name.as_str())
        .collect();
    assert_eq!(authors, ["Wes", "Debbie"]);
    assert_eq!(detail.reviews[0].review.rating.value(), 5);
}
