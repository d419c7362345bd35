//! Integration tests for registration and account updates.

#![allow(clippy::unwrap_used)]

use storefinder_catalog::CatalogError;
use storefinder_catalog::validation::{AccountInput, RegisterInput};
use storefinder_core::UserId;
use storefinder_integration_tests::{catalog, register};

fn registration(name: &str, email: &str) -> RegisterInput {
    RegisterInput {
        name: name.to_owned(),
        email: email.to_owned(),
        password: "correct horse".to_owned(),
        password_confirm: "correct horse".to_owned(),
    }
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_normalizes_email() {
    let catalog = catalog().await;

    let user = catalog
        .register_user(&registration(" Wes ", "Wes@Example.COM"))
        .await
        .unwrap();
    assert_eq!(user.name, "Wes");
    assert_eq!(user.email.as_str(), "wes@example.com");
    assert!(user.hearts.is_empty());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let catalog = catalog().await;
    catalog
        .register_user(&registration("Wes", "wes@example.com"))
        .await
        .unwrap();

    let err = catalog
        .register_user(&registration("Other Wes", "WES@example.com"))
        .await
        .unwrap_err();
    let errors = err.field_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "email");
    assert_eq!(errors[0].message, "That email is already registered!");
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let catalog = catalog().await;
    let input = RegisterInput {
        password_confirm: "battery staple".to_owned(),
        ..registration("Wes", "wes@example.com")
    };

    let err = catalog.register_user(&input).await.unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));
    assert_eq!(err.field_errors()[0].field, "password_confirm");
}

// =============================================================================
// Account Updates
// =============================================================================

#[tokio::test]
async fn test_update_account() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;

    let updated = catalog
        .update_account(
            wes.id,
            &AccountInput {
                name: "Wesley".to_owned(),
                email: "wesley@example.com".to_owned(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, wes.id);
    assert_eq!(updated.name, "Wesley");
    assert_eq!(updated.email.as_str(), "wesley@example.com");
}

#[tokio::test]
async fn test_update_account_taken_email() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;
    register(&catalog, "Debbie").await;

    let err = catalog
        .update_account(
            wes.id,
            &AccountInput {
                name: "Wes".to_owned(),
                email: "debbie@example.com".to_owned(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.field_errors()[0].field, "email");
}

#[tokio::test]
async fn test_update_account_keeps_own_email() {
    let catalog = catalog().await;
    let wes = register(&catalog, "Wes").await;

    let updated = catalog
        .update_account(
            wes.id,
            &AccountInput {
                name: "Wes Bos".to_owned(),
                email: "wes@example.com".to_owned(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Wes Bos");
}

#[tokio::test]
async fn test_update_account_unknown_user() {
    let catalog = catalog().await;

    let err = catalog
        .update_account(
            UserId::new(42),
            &AccountInput {
                name: "Ghost".to_owned(),
                email: "ghost@example.com".to_owned(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
}
