//! Integration tests for loading the sample seed file.

#![allow(clippy::unwrap_used)]

use storefinder_catalog::CatalogError;
use storefinder_catalog::seed::{self, SeedData, SeedSummary};
use storefinder_integration_tests::catalog;

const SAMPLE: &str = include_str!("../../cli/data/sample.yaml");

#[tokio::test]
async fn test_sample_seed_applies() {
    let catalog = catalog().await;
    let data: SeedData = serde_yaml::from_str(SAMPLE).unwrap();

    let summary = seed::apply(&catalog, &data).await.unwrap();
    assert_eq!(
        summary,
        SeedSummary {
            users: 3,
            stores: 4,
            reviews: 5,
        }
    );

    let mut slugs: Vec<String> = catalog
        .list_stores()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.slug.into_inner())
        .collect();
    slugs.sort();
    assert_eq!(
        slugs,
        [
            "cool-cafe",
            "cool-cafe-2",
            "creme-de-la-creme-bakery",
            "page-turner-books-and-coffee",
        ]
    );

    let top = catalog.top_stores().await.unwrap();
    let names: Vec<&str> = top.iter().map(|t| t.slug.as_str()).collect();
    assert_eq!(names, ["cool-cafe", "page-turner-books-and-coffee"]);
}

#[tokio::test]
async fn test_seed_unknown_author() {
    let catalog = catalog().await;
    let data: SeedData = serde_yaml::from_str(
        r"
stores:
  - author: nobody
    name: Orphan
    address: 1 Main St
    longitude: 0.0
    latitude: 0.0
",
    )
    .unwrap();

    let err = seed::apply(&catalog, &data).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
}
