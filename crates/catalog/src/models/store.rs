//! Store domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefinder_core::{Location, Slug, StoreId, UserId};

use super::review::AuthoredReview;
use super::user::User;

/// A catalog entry (domain type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    /// Unique store ID, assigned by the repository.
    pub id: StoreId,
    /// Display name, trimmed.
    pub name: String,
    /// Unique URL identifier derived from `name`.
    pub slug: Slug,
    /// Free-text description, trimmed.
    pub description: String,
    /// Tags in the order the author chose them.
    pub tags: Vec<String>,
    /// When the store was created.
    pub created: DateTime<Utc>,
    /// Coordinates and street address.
    pub location: Location,
    /// Photo filename owned by the upload service.
    pub photo: Option<String>,
    /// The user who created the store. Never changes.
    pub author: UserId,
}

/// A store ready to be inserted. The slug is already resolved.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub tags: Vec<String>,
    pub location: Location,
    pub photo: Option<String>,
    pub author: UserId,
}

/// Replacement values for the mutable fields of a store.
///
/// `author` and `created` are deliberately absent.
#[derive(Debug, Clone)]
pub struct StoreChanges {
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub tags: Vec<String>,
    pub location: Location,
    pub photo: Option<String>,
}

/// The projection returned by proximity queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub slug: Slug,
    pub name: String,
    pub description: String,
    pub location: Location,
    pub photo: Option<String>,
}

impl From<Store> for StoreSummary {
    fn from(store: Store) -> Self {
        Self {
            slug: store.slug,
            name: store.name,
            description: store.description,
            location: store.location,
            photo: store.photo,
        }
    }
}

/// A store as shown on its own page: author and every review attached.
#[derive(Debug, Clone, Serialize)]
pub struct StoreDetail {
    pub store: Store,
    /// `None` only if the author row has gone missing.
    pub author: Option<User>,
    /// Newest first.
    pub reviews: Vec<AuthoredReview>,
}
