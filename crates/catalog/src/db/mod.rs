//! Persistence for the catalog.
//!
//! # Backends
//!
//! - [`PgCatalogRepository`] - `PostgreSQL` (schema `storefinder`)
//! - [`InMemoryRepository`] - process-local, used by tests, demos and seeding
//!   dry-runs
//!
//! Both implement [`CatalogRepository`], the create/read/update and
//! index-backed query primitives the catalog components are built on.
//!
//! ## Tables
//!
//! - `user` - Profiles (unique lowercase email)
//! - `store` - Catalog entries (unique slug, GIN index on tags)
//! - `review` - Ratings, indexed by store
//! - `user_heart` - Favorites set, one row per (user, store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/catalog/migrations/` and run via:
//! ```bash
//! cargo run -p storefinder-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use storefinder_core::{Email, GeoPoint, Slug, StoreId, UserId};

use crate::models::{NewReview, NewStore, NewUser, Review, Store, StoreChanges, User};

pub use memory::InMemoryRepository;
pub use postgres::PgCatalogRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Which stores a tag-scoped listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFilter<'a> {
    /// Stores with at least one tag.
    AnyTag,
    /// Stores whose tags contain exactly this value.
    Tag(&'a str),
}

impl TagFilter<'_> {
    /// Whether a store's tag list passes the filter.
    #[must_use]
    pub fn matches(&self, tags: &[String]) -> bool {
        match self {
            Self::AnyTag => !tags.is_empty(),
            Self::Tag(tag) => tags.iter().any(|t| t == tag),
        }
    }
}

/// A store joined to every review that references it.
#[derive(Debug, Clone)]
pub struct StoreReviews {
    pub store: Store,
    pub reviews: Vec<Review>,
}

/// Storage primitives the catalog is built on.
///
/// Implementations perform no business rules beyond uniqueness: slug
/// derivation, ownership checks and ranking all live in the services.
/// Every listing of stores is ordered newest first (`created` descending,
/// then id descending) unless stated otherwise.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ---------------------------------------------------------------------
    // Stores
    // ---------------------------------------------------------------------

    /// Insert a store and return it with its assigned id and timestamp.
    ///
    /// Fails with [`RepositoryError::Conflict`] if the slug is taken.
    async fn insert_store(&self, store: NewStore) -> Result<Store, RepositoryError>;

    /// Replace the mutable fields of a store.
    ///
    /// Fails with [`RepositoryError::NotFound`] for an unknown id and
    /// [`RepositoryError::Conflict`] if the new slug is taken.
    async fn update_store(&self, id: StoreId, changes: StoreChanges)
    -> Result<Store, RepositoryError>;

    async fn get_store(&self, id: StoreId) -> Result<Option<Store>, RepositoryError>;

    async fn get_store_by_slug(&self, slug: &str) -> Result<Option<Store>, RepositoryError>;

    /// Count stores whose slug matches `base`'s family pattern
    /// (case-insensitive, anchored), ignoring `exclude`.
    async fn count_slug_family(
        &self,
        base: &Slug,
        exclude: Option<StoreId>,
    ) -> Result<usize, RepositoryError>;

    /// Newest-first listing, skipping `skip` stores and returning at most
    /// `limit` (all remaining when `None`).
    async fn list_stores(
        &self,
        skip: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Store>, RepositoryError>;

    async fn count_stores(&self) -> Result<usize, RepositoryError>;

    async fn stores_by_tag(&self, filter: TagFilter<'_>) -> Result<Vec<Store>, RepositoryError>;

    /// The tag list of every store, one entry per store.
    async fn store_tag_lists(&self) -> Result<Vec<Vec<String>>, RepositoryError>;

    /// Stores strictly closer than `max_distance_m` to `point`, nearest
    /// first, at most `limit`.
    async fn stores_near(
        &self,
        point: GeoPoint,
        max_distance_m: f64,
        limit: usize,
    ) -> Result<Vec<Store>, RepositoryError>;

    /// Stores with the given ids, in no particular order. Unknown ids are
    /// skipped.
    async fn stores_by_ids(&self, ids: &[StoreId]) -> Result<Vec<Store>, RepositoryError>;

    // ---------------------------------------------------------------------
    // Reviews
    // ---------------------------------------------------------------------

    async fn insert_review(&self, review: NewReview) -> Result<Review, RepositoryError>;

    /// Every review of a store, newest first.
    async fn reviews_for_store(&self, store: StoreId) -> Result<Vec<Review>, RepositoryError>;

    /// Stores with at least `min_reviews` reviews, each joined to its
    /// reviews (newest first). Store order follows [`Self::list_stores`].
    async fn reviewed_stores(&self, min_reviews: usize)
    -> Result<Vec<StoreReviews>, RepositoryError>;

    // ---------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------

    /// Fails with [`RepositoryError::Conflict`] if the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Users with the given ids, unknown ids skipped.
    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError>;

    /// Fails with [`RepositoryError::NotFound`] for an unknown id and
    /// [`RepositoryError::Conflict`] if the email is taken by someone else.
    async fn update_user(
        &self,
        id: UserId,
        name: String,
        email: Email,
    ) -> Result<User, RepositoryError>;

    /// Add `store` to the user's hearts (no-op if present) and return the
    /// updated user.
    async fn add_heart(&self, user: UserId, store: StoreId) -> Result<User, RepositoryError>;

    /// Remove `store` from the user's hearts (no-op if absent) and return
    /// the updated user.
    async fn remove_heart(&self, user: UserId, store: StoreId) -> Result<User, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_filter_any() {
        assert!(!TagFilter::AnyTag.matches(&[]));
        assert!(TagFilter::AnyTag.matches(&["wifi".to_owned()]));
    }

    #[test]
    fn test_tag_filter_exact() {
        let tags = vec!["Wifi".to_owned(), "Family Friendly".to_owned()];
        assert!(TagFilter::Tag("Wifi").matches(&tags));
        assert!(!TagFilter::Tag("wifi").matches(&tags));
        assert!(!TagFilter::Tag("Family").matches(&tags));
    }
}
