//! User domain types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use storefinder_core::{Email, StoreId, UserId};

/// A registered user.
///
/// Credentials are held by the authentication service; this record only
/// carries profile data and the user's favorites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique, lowercase.
    pub email: Email,
    pub name: String,
    /// Favorited stores ("hearts").
    pub hearts: BTreeSet<StoreId>,
}

impl User {
    /// Whether the user has hearted `store`.
    #[must_use]
    pub fn has_hearted(&self, store: StoreId) -> bool {
        self.hearts.contains(&store)
    }
}

/// A validated user ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub name: String,
}
