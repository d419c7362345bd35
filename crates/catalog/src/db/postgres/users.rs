//! User and heart queries.

use sqlx::PgPool;

use storefinder_core::{Email, StoreId, UserId};

use super::{RepositoryError, conflict_on_unique, not_found_on_foreign_key};
use crate::models::{NewUser, User};

/// Hearts are aggregated into an array so one row carries the whole user.
const USER_COLUMNS: &str = "u.id, u.email, u.name, \
    ARRAY(SELECT h.store_id FROM storefinder.user_heart h \
          WHERE h.user_id = u.id ORDER BY h.store_id) AS hearts";

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    name: String,
    hearts: Vec<i32>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            name: row.name,
            hearts: row.hearts.into_iter().map(StoreId::new).collect(),
        })
    }
}

pub(super) async fn insert(pool: &PgPool, user: NewUser) -> Result<User, RepositoryError> {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO storefinder.user (email, name) VALUES ($1, $2) RETURNING id",
    )
    .bind(user.email.as_str())
    .bind(&user.name)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, "email"))?;

    Ok(User {
        id: UserId::new(id),
        email: user.email,
        name: user.name,
        hearts: std::collections::BTreeSet::new(),
    })
}

pub(super) async fn get_by_id(pool: &PgPool, id: UserId) -> Result<Option<User>, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM storefinder.user u WHERE u.id = $1"
    ))
    .bind(id.as_i32())
    .fetch_optional(pool)
    .await?;

    row.map(TryInto::try_into).transpose()
}

pub(super) async fn get_many(pool: &PgPool, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
    let ids: Vec<i32> = ids.iter().map(UserId::as_i32).collect();
    let rows = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM storefinder.user u WHERE u.id = ANY($1) ORDER BY u.id"
    ))
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(TryInto::try_into).collect()
}

pub(super) async fn update(
    pool: &PgPool,
    id: UserId,
    name: &str,
    email: &Email,
) -> Result<User, RepositoryError> {
    let updated = sqlx::query("UPDATE storefinder.user SET name = $2, email = $3 WHERE id = $1")
        .bind(id.as_i32())
        .bind(name)
        .bind(email.as_str())
        .execute(pool)
        .await
        .map_err(|e| conflict_on_unique(e, "email"))?;

    if updated.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    get_by_id(pool, id).await?.ok_or(RepositoryError::NotFound)
}

pub(super) async fn add_heart(
    pool: &PgPool,
    user: UserId,
    store: StoreId,
) -> Result<User, RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO storefinder.user_heart (user_id, store_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, store_id) DO NOTHING
        ",
    )
    .bind(user.as_i32())
    .bind(store.as_i32())
    .execute(pool)
    .await
    .map_err(not_found_on_foreign_key)?;

    get_by_id(pool, user).await?.ok_or(RepositoryError::NotFound)
}

pub(super) async fn remove_heart(
    pool: &PgPool,
    user: UserId,
    store: StoreId,
) -> Result<User, RepositoryError> {
    sqlx::query("DELETE FROM storefinder.user_heart WHERE user_id = $1 AND store_id = $2")
        .bind(user.as_i32())
        .bind(store.as_i32())
        .execute(pool)
        .await?;

    get_by_id(pool, user).await?.ok_or(RepositoryError::NotFound)
}
