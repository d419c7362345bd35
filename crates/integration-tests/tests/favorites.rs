//! Integration tests for hearts.

#![allow(clippy::unwrap_used)]

use storefinder_catalog::CatalogError;
use storefinder_core::{StoreId, UserId};
use storefinder_integration_tests::{catalog, create_tagged, register};

#[tokio::test]
async fn test_toggle_twice_restores_membership() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    let store = create_tagged(&catalog, &wes, "Cool Cafe", &[]).await;

    let hearted = catalog.toggle_heart(wes.id, store.id).await.unwrap();
    assert!(hearted.hearts.contains(&store.id));

    let restored = catalog.toggle_heart(wes.id, store.id).await.unwrap();
    assert_eq!(restored.hearts, wes.hearts);
}

#[tokio::test]
async fn test_toggle_only_touches_one_store() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    let first = create_tagged(&catalog, &wes, "First", &[]).await;
    let second = create_tagged(&catalog, &wes, "Second", &[]).await;

    catalog.toggle_heart(wes.id, first.id).await.unwrap();
    let user = catalog.toggle_heart(wes.id, second.id).await.unwrap();
    assert_eq!(user.hearts.len(), 2);

    let user = catalog.toggle_heart(wes.id, first.id).await.unwrap();
    assert_eq!(user.hearts.iter().copied().collect::<Vec<_>>(), [second.id]);
}

#[tokio::test]
async fn test_hearts_are_per_user() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    let debbie = register(&catalog, "Debbie").await;
    let store = create_tagged(&catalog, &wes, "Cool Cafe", &[]).await;

    catalog.toggle_heart(wes.id, store.id).await.unwrap();

    assert_eq!(catalog.list_hearted(wes.id).await.unwrap().len(), 1);
    assert!(catalog.list_hearted(debbie.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_hearted_newest_first() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    let older = create_tagged(&catalog, &wes, "Older", &[]).await;
    let newer = create_tagged(&catalog, &wes, "Newer", &[]).await;

    catalog.toggle_heart(wes.id, older.id).await.unwrap();
    catalog.toggle_heart(wes.id, newer.id).await.unwrap();

    let names: Vec<String> = catalog
        .list_hearted(wes.id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, ["Newer", "Older"]);
}

#[tokio::test]
async fn test_toggle_unknown_ids() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    let store = create_tagged(&catalog, &wes, "Cool Cafe", &[]).await;

    assert!(matches!(
        catalog.toggle_heart(wes.id, StoreId::new(999)).await,
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        catalog.toggle_heart(UserId::new(999), store.id).await,
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        catalog.list_hearted(UserId::new(999)).await,
        Err(CatalogError::NotFound(_))
    ));
}
