//! Loading sample users, stores and reviews through the write path.
//!
//! Seed files refer to users by a local `key` so stores and reviews can name
//! their authors before ids exist. Every record goes through the same
//! validation and slug assignment as a live write.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{info, instrument};

use storefinder_core::UserId;

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::validation::{RegisterInput, ReviewInput, StoreInput};

/// Contents of a seed file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub users: Vec<SeedUser>,
    pub stores: Vec<SeedStore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    /// Local reference used by `author` fields.
    pub key: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedStore {
    pub author: String,
    #[serde(flatten)]
    pub store: StoreInput,
    #[serde(default)]
    pub reviews: Vec<SeedReview>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedReview {
    pub author: String,
    #[serde(flatten)]
    pub review: ReviewInput,
}

/// Counts of what a seed run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub stores: usize,
    pub reviews: usize,
}

/// Write every record in `data`, users first.
///
/// Stops at the first failure; records written before it stay.
///
/// # Errors
///
/// Returns `CatalogError::NotFound` for an `author` key with no matching
/// user and any error from the underlying write.
#[instrument(skip_all, fields(users = data.users.len(), stores = data.stores.len()))]
pub async fn apply(catalog: &Catalog, data: &SeedData) -> Result<SeedSummary, CatalogError> {
    let mut summary = SeedSummary::default();
    let mut keys: HashMap<&str, UserId> = HashMap::new();

    for user in &data.users {
        let created = catalog
            .register_user(&RegisterInput {
                name: user.name.clone(),
                email: user.email.clone(),
                password: user.password.clone(),
                password_confirm: user.password.clone(),
            })
            .await?;
        keys.insert(user.key.as_str(), created.id);
        summary.users += 1;
    }

    let author_of = |key: &str| {
        keys.get(key)
            .copied()
            .ok_or_else(|| CatalogError::NotFound(format!("seed user {key}")))
    };

    for entry in &data.stores {
        let store = catalog
            .create_store(author_of(&entry.author)?, &entry.store)
            .await?;
        summary.stores += 1;

        for review in &entry.reviews {
            catalog
                .add_review(author_of(&review.author)?, store.id, &review.review)
                .await?;
            summary.reviews += 1;
        }
    }

    info!(
        users = summary.users,
        stores = summary.stores,
        reviews = summary.reviews,
        "Seeding complete"
    );
    Ok(summary)
}
