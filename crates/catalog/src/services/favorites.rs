//! Per-user favorites ("hearts").

use tracing::{debug, instrument};

use storefinder_core::{StoreId, UserId};

use crate::db::{CatalogRepository, RepositoryError};
use crate::models::{Store, User};

/// Flip `store`'s membership in the user's hearts and return the updated
/// user. Two calls restore the original membership.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user does not exist.
#[instrument(skip(repo), fields(user = %user, store = %store))]
pub async fn toggle_heart(
    repo: &dyn CatalogRepository,
    user: UserId,
    store: StoreId,
) -> Result<User, RepositoryError> {
    let current = repo.get_user(user).await?.ok_or(RepositoryError::NotFound)?;

    if current.has_hearted(store) {
        debug!("Removing heart");
        repo.remove_heart(user, store).await
    } else {
        debug!("Adding heart");
        repo.add_heart(user, store).await
    }
}

/// The stores the user has hearted, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user does not exist.
#[instrument(skip(repo), fields(user = %user))]
pub async fn list_hearted(
    repo: &dyn CatalogRepository,
    user: UserId,
) -> Result<Vec<Store>, RepositoryError> {
    let user = repo.get_user(user).await?.ok_or(RepositoryError::NotFound)?;
    let ids: Vec<StoreId> = user.hearts.into_iter().collect();

    let mut stores = repo.stores_by_ids(&ids).await?;
    stores.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
    Ok(stores)
}
