//! `PostgreSQL` implementation of [`CatalogRepository`].
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate compiles
//! without a live database; row types convert into domain types through
//! `TryFrom`, reporting bad stored values as
//! [`RepositoryError::DataCorruption`].

mod reviews;
mod stores;
mod users;

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use storefinder_core::{Email, GeoPoint, Slug, StoreId, UserId};

use super::{CatalogRepository, RepositoryError, StoreReviews, TagFilter};
use crate::models::{NewReview, NewStore, NewUser, Review, Store, StoreChanges, User};

/// Repository over a `PostgreSQL` pool (schema `storefinder`).
#[derive(Debug, Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for running migrations.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a unique violation to [`RepositoryError::Conflict`].
fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Map a foreign key violation to [`RepositoryError::NotFound`].
fn not_found_on_foreign_key(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::NotFound;
    }
    RepositoryError::Database(e)
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn to_usize(n: i64) -> Result<usize, RepositoryError> {
    usize::try_from(n).map_err(|_| RepositoryError::DataCorruption(format!("negative count: {n}")))
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn insert_store(&self, store: NewStore) -> Result<Store, RepositoryError> {
        stores::insert(&self.pool, store).await
    }

    async fn update_store(
        &self,
        id: StoreId,
        changes: StoreChanges,
    ) -> Result<Store, RepositoryError> {
        stores::update(&self.pool, id, changes).await
    }

    async fn get_store(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        stores::get_by_id(&self.pool, id).await
    }

    async fn get_store_by_slug(&self, slug: &str) -> Result<Option<Store>, RepositoryError> {
        stores::get_by_slug(&self.pool, slug).await
    }

    async fn count_slug_family(
        &self,
        base: &Slug,
        exclude: Option<StoreId>,
    ) -> Result<usize, RepositoryError> {
        stores::count_slug_family(&self.pool, base, exclude).await
    }

    async fn list_stores(
        &self,
        skip: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Store>, RepositoryError> {
        stores::list(&self.pool, skip, limit).await
    }

    async fn count_stores(&self) -> Result<usize, RepositoryError> {
        stores::count(&self.pool).await
    }

    async fn stores_by_tag(&self, filter: TagFilter<'_>) -> Result<Vec<Store>, RepositoryError> {
        stores::by_tag(&self.pool, filter).await
    }

    async fn store_tag_lists(&self) -> Result<Vec<Vec<String>>, RepositoryError> {
        stores::tag_lists(&self.pool).await
    }

    async fn stores_near(
        &self,
        point: GeoPoint,
        max_distance_m: f64,
        limit: usize,
    ) -> Result<Vec<Store>, RepositoryError> {
        stores::near(&self.pool, point, max_distance_m, limit).await
    }

    async fn stores_by_ids(&self, ids: &[StoreId]) -> Result<Vec<Store>, RepositoryError> {
        stores::by_ids(&self.pool, ids).await
    }

    async fn insert_review(&self, review: NewReview) -> Result<Review, RepositoryError> {
        reviews::insert(&self.pool, review).await
    }

    async fn reviews_for_store(&self, store: StoreId) -> Result<Vec<Review>, RepositoryError> {
        reviews::for_store(&self.pool, store).await
    }

    async fn reviewed_stores(
        &self,
        min_reviews: usize,
    ) -> Result<Vec<StoreReviews>, RepositoryError> {
        let stores = stores::with_min_reviews(&self.pool, min_reviews).await?;
        let ids: Vec<StoreId> = stores.iter().map(|s| s.id).collect();

        let mut by_store: HashMap<StoreId, Vec<Review>> = HashMap::new();
        for review in reviews::for_stores(&self.pool, &ids).await? {
            by_store.entry(review.store).or_default().push(review);
        }

        Ok(stores
            .into_iter()
            .map(|store| StoreReviews {
                reviews: by_store.remove(&store.id).unwrap_or_default(),
                store,
            })
            .collect())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        users::insert(&self.pool, user).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        users::get_by_id(&self.pool, id).await
    }

    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        users::get_many(&self.pool, ids).await
    }

    async fn update_user(
        &self,
        id: UserId,
        name: String,
        email: Email,
    ) -> Result<User, RepositoryError> {
        users::update(&self.pool, id, &name, &email).await
    }

    async fn add_heart(&self, user: UserId, store: StoreId) -> Result<User, RepositoryError> {
        users::add_heart(&self.pool, user, store).await
    }

    async fn remove_heart(&self, user: UserId, store: StoreId) -> Result<User, RepositoryError> {
        users::remove_heart(&self.pool, user, store).await
    }
}
