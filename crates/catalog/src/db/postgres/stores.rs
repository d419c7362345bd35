//! Store queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use storefinder_core::{EARTH_RADIUS_METERS, GeoPoint, Location, Slug, StoreId, UserId};

use super::{RepositoryError, conflict_on_unique, to_i64, to_usize};
use crate::db::TagFilter;
use crate::models::{NewStore, Store, StoreChanges};

// =============================================================================
// Internal Row Types
// =============================================================================

const STORE_COLUMNS: &str = "id, name, slug, description, tags, created_at, \
                             longitude, latitude, address, photo, author_id";

/// Internal row type for `PostgreSQL` store queries.
#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: i32,
    name: String,
    slug: String,
    description: String,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    longitude: f64,
    latitude: f64,
    address: String,
    photo: Option<String>,
    author_id: i32,
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug in database: {e}"))
        })?;
        let coordinates = GeoPoint::new(row.longitude, row.latitude).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid coordinates in database: {e}"))
        })?;

        Ok(Self {
            id: StoreId::new(row.id),
            name: row.name,
            slug,
            description: row.description,
            tags: row.tags,
            created: row.created_at,
            location: Location {
                coordinates,
                address: row.address,
            },
            photo: row.photo,
            author: UserId::new(row.author_id),
        })
    }
}

fn collect(rows: Vec<StoreRow>) -> Result<Vec<Store>, RepositoryError> {
    rows.into_iter().map(TryInto::try_into).collect()
}

// =============================================================================
// Queries
// =============================================================================

pub(super) async fn insert(pool: &PgPool, store: NewStore) -> Result<Store, RepositoryError> {
    let row = sqlx::query_as::<_, StoreRow>(&format!(
        r"
        INSERT INTO storefinder.store
            (name, slug, description, tags, longitude, latitude, address, photo, author_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {STORE_COLUMNS}
        "
    ))
    .bind(&store.name)
    .bind(store.slug.as_str())
    .bind(&store.description)
    .bind(&store.tags)
    .bind(store.location.coordinates.lng())
    .bind(store.location.coordinates.lat())
    .bind(&store.location.address)
    .bind(store.photo.as_deref())
    .bind(store.author.as_i32())
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, "slug"))?;

    row.try_into()
}

pub(super) async fn update(
    pool: &PgPool,
    id: StoreId,
    changes: StoreChanges,
) -> Result<Store, RepositoryError> {
    let row = sqlx::query_as::<_, StoreRow>(&format!(
        r"
        UPDATE storefinder.store
        SET name = $2, slug = $3, description = $4, tags = $5,
            longitude = $6, latitude = $7, address = $8, photo = $9
        WHERE id = $1
        RETURNING {STORE_COLUMNS}
        "
    ))
    .bind(id.as_i32())
    .bind(&changes.name)
    .bind(changes.slug.as_str())
    .bind(&changes.description)
    .bind(&changes.tags)
    .bind(changes.location.coordinates.lng())
    .bind(changes.location.coordinates.lat())
    .bind(&changes.location.address)
    .bind(changes.photo.as_deref())
    .fetch_optional(pool)
    .await
    .map_err(|e| conflict_on_unique(e, "slug"))?
    .ok_or(RepositoryError::NotFound)?;

    row.try_into()
}

pub(super) async fn get_by_id(pool: &PgPool, id: StoreId) -> Result<Option<Store>, RepositoryError> {
    let row = sqlx::query_as::<_, StoreRow>(&format!(
        "SELECT {STORE_COLUMNS} FROM storefinder.store WHERE id = $1"
    ))
    .bind(id.as_i32())
    .fetch_optional(pool)
    .await?;

    row.map(TryInto::try_into).transpose()
}

pub(super) async fn get_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Store>, RepositoryError> {
    let row = sqlx::query_as::<_, StoreRow>(&format!(
        "SELECT {STORE_COLUMNS} FROM storefinder.store WHERE slug = $1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    row.map(TryInto::try_into).transpose()
}

pub(super) async fn count_slug_family(
    pool: &PgPool,
    base: &Slug,
    exclude: Option<StoreId>,
) -> Result<usize, RepositoryError> {
    let count: i64 = sqlx::query_scalar(
        r"
        SELECT COUNT(*) FROM storefinder.store
        WHERE slug ~* $1 AND ($2::INTEGER IS NULL OR id <> $2)
        ",
    )
    .bind(base.family_pattern())
    .bind(exclude.map(|id| id.as_i32()))
    .fetch_one(pool)
    .await?;

    to_usize(count)
}

pub(super) async fn list(
    pool: &PgPool,
    skip: usize,
    limit: Option<usize>,
) -> Result<Vec<Store>, RepositoryError> {
    let rows = sqlx::query_as::<_, StoreRow>(&format!(
        r"
        SELECT {STORE_COLUMNS} FROM storefinder.store
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $1
        "
    ))
    .bind(to_i64(skip))
    .bind(limit.map(to_i64))
    .fetch_all(pool)
    .await?;

    collect(rows)
}

/// Stores referenced by at least `min_reviews` reviews, newest first.
pub(super) async fn with_min_reviews(
    pool: &PgPool,
    min_reviews: usize,
) -> Result<Vec<Store>, RepositoryError> {
    let rows = sqlx::query_as::<_, StoreRow>(&format!(
        r"
        SELECT {STORE_COLUMNS} FROM storefinder.store
        WHERE $1 <= 0 OR id IN (
            SELECT store_id FROM storefinder.review
            GROUP BY store_id
            HAVING COUNT(*) >= $1
        )
        ORDER BY created_at DESC, id DESC
        "
    ))
    .bind(to_i64(min_reviews))
    .fetch_all(pool)
    .await?;

    collect(rows)
}

pub(super) async fn count(pool: &PgPool) -> Result<usize, RepositoryError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM storefinder.store")
        .fetch_one(pool)
        .await?;

    to_usize(count)
}

pub(super) async fn by_tag(
    pool: &PgPool,
    filter: TagFilter<'_>,
) -> Result<Vec<Store>, RepositoryError> {
    let rows = match filter {
        TagFilter::AnyTag => {
            sqlx::query_as::<_, StoreRow>(&format!(
                r"
                SELECT {STORE_COLUMNS} FROM storefinder.store
                WHERE cardinality(tags) > 0
                ORDER BY created_at DESC, id DESC
                "
            ))
            .fetch_all(pool)
            .await?
        }
        TagFilter::Tag(tag) => {
            sqlx::query_as::<_, StoreRow>(&format!(
                r"
                SELECT {STORE_COLUMNS} FROM storefinder.store
                WHERE tags @> ARRAY[$1]::TEXT[]
                ORDER BY created_at DESC, id DESC
                "
            ))
            .bind(tag)
            .fetch_all(pool)
            .await?
        }
    };

    collect(rows)
}

pub(super) async fn tag_lists(pool: &PgPool) -> Result<Vec<Vec<String>>, RepositoryError> {
    let lists: Vec<Vec<String>> = sqlx::query_scalar("SELECT tags FROM storefinder.store")
        .fetch_all(pool)
        .await?;

    Ok(lists)
}

/// Haversine distance in SQL; `LEAST` guards `asin` against rounding above 1.
///
/// The bounding box of the search circle is applied first so the
/// `(latitude, longitude)` index narrows the rows before any distance is
/// computed.
pub(super) async fn near(
    pool: &PgPool,
    point: GeoPoint,
    max_distance_m: f64,
    limit: usize,
) -> Result<Vec<Store>, RepositoryError> {
    let bbox = point.bounding_box(max_distance_m);

    let rows = sqlx::query_as::<_, StoreRow>(&format!(
        r"
        SELECT {STORE_COLUMNS} FROM (
            SELECT s.*,
                   2 * $5 * asin(LEAST(1.0, sqrt(
                       power(sin(radians(s.latitude - $2) / 2), 2)
                       + cos(radians($2)) * cos(radians(s.latitude))
                         * power(sin(radians(s.longitude - $1) / 2), 2)
                   ))) AS distance_m
            FROM storefinder.store s
            WHERE s.latitude BETWEEN $6 AND $7
              AND s.longitude BETWEEN $8 AND $9
        ) d
        WHERE distance_m < $3
        ORDER BY distance_m, id
        LIMIT $4
        "
    ))
    .bind(point.lng())
    .bind(point.lat())
    .bind(max_distance_m)
    .bind(to_i64(limit))
    .bind(EARTH_RADIUS_METERS)
    .bind(bbox.min_lat)
    .bind(bbox.max_lat)
    .bind(bbox.min_lng)
    .bind(bbox.max_lng)
    .fetch_all(pool)
    .await?;

    collect(rows)
}

pub(super) async fn by_ids(pool: &PgPool, ids: &[StoreId]) -> Result<Vec<Store>, RepositoryError> {
    let ids: Vec<i32> = ids.iter().map(StoreId::as_i32).collect();
    let rows = sqlx::query_as::<_, StoreRow>(&format!(
        "SELECT {STORE_COLUMNS} FROM storefinder.store WHERE id = ANY($1) ORDER BY id"
    ))
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    collect(rows)
}
