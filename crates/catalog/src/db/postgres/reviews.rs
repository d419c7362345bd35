//! Review queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use storefinder_core::{Rating, ReviewId, StoreId, UserId};

use super::{RepositoryError, not_found_on_foreign_key};
use crate::models::{NewReview, Review};

const REVIEW_COLUMNS: &str = "id, store_id, author_id, text, rating, created_at";

/// Internal row type for `PostgreSQL` review queries.
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    store_id: i32,
    author_id: i32,
    text: String,
    rating: i16,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = Rating::new(i64::from(row.rating)).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid rating in database: {e}"))
        })?;

        Ok(Self {
            id: ReviewId::new(row.id),
            store: StoreId::new(row.store_id),
            author: UserId::new(row.author_id),
            text: row.text,
            rating,
            created: row.created_at,
        })
    }
}

pub(super) async fn insert(pool: &PgPool, review: NewReview) -> Result<Review, RepositoryError> {
    let row = sqlx::query_as::<_, ReviewRow>(&format!(
        r"
        INSERT INTO storefinder.review (store_id, author_id, text, rating)
        VALUES ($1, $2, $3, $4)
        RETURNING {REVIEW_COLUMNS}
        "
    ))
    .bind(review.store.as_i32())
    .bind(review.author.as_i32())
    .bind(&review.text)
    .bind(i16::from(review.rating.value()))
    .fetch_one(pool)
    .await
    .map_err(not_found_on_foreign_key)?;

    row.try_into()
}

pub(super) async fn for_store(pool: &PgPool, store: StoreId) -> Result<Vec<Review>, RepositoryError> {
    let rows = sqlx::query_as::<_, ReviewRow>(&format!(
        r"
        SELECT {REVIEW_COLUMNS} FROM storefinder.review
        WHERE store_id = $1
        ORDER BY created_at DESC, id DESC
        "
    ))
    .bind(store.as_i32())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(TryInto::try_into).collect()
}

/// Reviews of any of `stores`, newest first.
pub(super) async fn for_stores(
    pool: &PgPool,
    stores: &[StoreId],
) -> Result<Vec<Review>, RepositoryError> {
    let ids: Vec<i32> = stores.iter().map(StoreId::as_i32).collect();
    let rows = sqlx::query_as::<_, ReviewRow>(&format!(
        r"
        SELECT {REVIEW_COLUMNS} FROM storefinder.review
        WHERE store_id = ANY($1)
        ORDER BY created_at DESC, id DESC
        "
    ))
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(TryInto::try_into).collect()
}
