//! Integration tests for Store Finder.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storefinder-integration-tests
//! ```
//!
//! The tests drive [`Catalog`] end to end over the in-memory repository, so
//! no database is needed.
//!
//! # Test Categories
//!
//! - `identity` - Slug assignment and store edits
//! - `discovery` - Tags, text search and proximity
//! - `ranking` - Top stores, reviews and store detail
//! - `favorites` - Hearts
//! - `pagination` - Paged listing and redirects
//! - `accounts` - Registration and account updates
//! - `seeding` - Loading the sample seed file

use std::sync::Arc;

use storefinder_catalog::db::InMemoryRepository;
use storefinder_catalog::models::{Store, User};
use storefinder_catalog::validation::{RegisterInput, StoreInput};
use storefinder_catalog::{Catalog, CatalogSettings};

/// A catalog over a fresh in-memory repository with default settings.
///
/// # Panics
///
/// Panics if the catalog cannot be opened.
pub async fn catalog() -> Catalog {
    catalog_with(CatalogSettings::default()).await
}

/// A catalog over a fresh in-memory repository.
///
/// # Panics
///
/// Panics if the catalog cannot be opened.
pub async fn catalog_with(settings: CatalogSettings) -> Catalog {
    Catalog::open(Arc::new(InMemoryRepository::new()), settings)
        .await
        .expect("in-memory catalog opens")
}

/// Register a user whose email is derived from `name`.
///
/// # Panics
///
/// Panics if registration fails.
pub async fn register(catalog: &Catalog, name: &str) -> User {
    let local: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase();
    catalog
        .register_user(&RegisterInput {
            name: name.to_owned(),
            email: format!("{local}@example.com"),
            password: "correct horse".to_owned(),
            password_confirm: "correct horse".to_owned(),
        })
        .await
        .expect("registration succeeds")
}

/// A valid store submission at the given point.
#[must_use]
pub fn store_input(name: &str, lng: f64, lat: f64) -> StoreInput {
    StoreInput {
        name: name.to_owned(),
        description: format!("All about {name}"),
        tags: Vec::new(),
        address: "1 Main St".to_owned(),
        longitude: Some(lng),
        latitude: Some(lat),
        photo: None,
    }
}

/// Create a store at (0, 0) with the given tags.
///
/// # Panics
///
/// Panics if creation fails.
pub async fn create_tagged(catalog: &Catalog, author: &User, name: &str, tags: &[&str]) -> Store {
    let input = StoreInput {
        tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        ..store_input(name, 0.0, 0.0)
    };
    catalog
        .create_store(author.id, &input)
        .await
        .expect("store is created")
}
