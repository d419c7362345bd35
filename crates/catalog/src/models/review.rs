//! Review domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefinder_core::{Rating, ReviewId, StoreId, UserId};

use super::user::User;

/// A user's rating of a store. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    /// The reviewed store.
    pub store: StoreId,
    /// The reviewing user.
    pub author: UserId,
    pub text: String,
    pub rating: Rating,
    pub created: DateTime<Utc>,
}

/// A validated review ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub store: StoreId,
    pub author: UserId,
    pub text: String,
    pub rating: Rating,
}

/// A review with its author's user record attached.
#[derive(Debug, Clone, Serialize)]
pub struct AuthoredReview {
    pub review: Review,
    pub author: Option<User>,
}
