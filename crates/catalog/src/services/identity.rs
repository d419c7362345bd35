//! Slug assignment.
//!
//! Runs as an explicit step before a store is written. The rule counts the
//! existing members of the base slug's family and appends `-<count + 1>`
//! when there are any; it never looks at the highest existing suffix and
//! never retries, so two writers racing on the same base may both pick the
//! same slug. The unique constraint then rejects the second write.

use tracing::{debug, instrument};

use storefinder_core::{Slug, StoreId};

use crate::db::{CatalogRepository, RepositoryError};

/// Whether a rename requires a new slug.
///
/// Names are compared after trimming, matching how they are stored.
#[must_use]
pub fn name_changed(current: &str, submitted: &str) -> bool {
    current.trim() != submitted.trim()
}

/// Resolve `base` to the slug the store will be written with.
///
/// `store` is the id of the store being renamed, if any; it is left out of
/// its own family count.
///
/// # Errors
///
/// Returns `RepositoryError` if the family count fails.
#[instrument(skip(repo), fields(base = %base))]
pub async fn assign_slug(
    repo: &dyn CatalogRepository,
    base: &Slug,
    store: Option<StoreId>,
) -> Result<Slug, RepositoryError> {
    let existing = repo.count_slug_family(base, store).await?;
    let slug = base.with_collisions(existing);
    if existing > 0 {
        debug!(existing, slug = %slug, "Slug collision resolved");
    }
    Ok(slug)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use storefinder_core::{GeoPoint, Location, UserId};

    use super::*;
    use crate::db::InMemoryRepository;
    use crate::models::NewStore;

    async fn insert(repo: &InMemoryRepository, slug: &str) -> StoreId {
        repo.insert_store(NewStore {
            name: slug.to_owned(),
            slug: Slug::parse(slug).unwrap(),
            description: String::new(),
            tags: Vec::new(),
            location: Location {
                coordinates: GeoPoint::new(0.0, 0.0).unwrap(),
                address: "here".to_owned(),
            },
            photo: None,
            author: UserId::new(1),
        })
        .await
        .unwrap()
        .id
    }

    #[test]
    fn test_name_changed_ignores_whitespace() {
        assert!(!name_changed("Cool Cafe", "  Cool Cafe "));
        assert!(name_changed("Cool Cafe", "Cool Cafe 2"));
        assert!(name_changed("Cool Cafe", "cool cafe"));
    }

    #[tokio::test]
    async fn test_assign_slug_counts_family() {
        let repo = InMemoryRepository::new();
        let base = Slug::parse("cool-cafe").unwrap();

        assert_eq!(assign_slug(&repo, &base, None).await.unwrap().as_str(), "cool-cafe");
        insert(&repo, "cool-cafe").await;
        assert_eq!(assign_slug(&repo, &base, None).await.unwrap().as_str(), "cool-cafe-2");
        insert(&repo, "cool-cafe-2").await;
        insert(&repo, "cool-cafe-bar").await;
        assert_eq!(assign_slug(&repo, &base, None).await.unwrap().as_str(), "cool-cafe-3");
    }

    #[tokio::test]
    async fn test_assign_slug_ignores_renamed_store() {
        let repo = InMemoryRepository::new();
        let id = insert(&repo, "tea-room").await;
        let base = Slug::parse("tea-room").unwrap();
        assert_eq!(
            assign_slug(&repo, &base, Some(id)).await.unwrap().as_str(),
            "tea-room"
        );
    }

    #[tokio::test]
    async fn test_count_rule_can_repeat_after_gap() {
        // Family {x, x-3}: count is 2, so the next slug is x-3 again.
        let repo = InMemoryRepository::new();
        insert(&repo, "x").await;
        insert(&repo, "x-3").await;
        let base = Slug::parse("x").unwrap();
        assert_eq!(assign_slug(&repo, &base, None).await.unwrap().as_str(), "x-3");
    }
}
