//! The top-stores ranking pipeline.
//!
//! Stages, in order:
//! 1. join stores to the reviews that reference them
//! 2. keep stores with at least [`MIN_REVIEWS_FOR_RANKING`] reviews
//!
//! The repository runs stages 1 and 2 together so the join only loads
//! stores that can rank; [`rank`] applies stage 2 again for any input.
//! 3. average their ratings
//! 4. sort by average, best first (stable, so ties keep repository order)
//! 5. truncate to the limit

use serde::Serialize;
use tracing::instrument;

use storefinder_core::Slug;

use crate::db::{CatalogRepository, RepositoryError, StoreReviews};
use crate::models::Review;

/// Stores with fewer reviews than this are left out of the ranking.
pub const MIN_REVIEWS_FOR_RANKING: usize = 2;

/// One entry of the top-stores ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopStore {
    pub name: String,
    pub slug: Slug,
    pub photo: Option<String>,
    pub reviews: Vec<Review>,
    /// Exact arithmetic mean of `reviews`' ratings.
    pub average_rating: f64,
}

/// Mean rating of `reviews`, or `None` when there are none.
#[must_use]
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: u64 = reviews.iter().map(|r| u64::from(r.rating.value())).sum();
    #[allow(clippy::cast_precision_loss)] // Review counts never approach 2^52
    let mean = total as f64 / reviews.len() as f64;
    Some(mean)
}

/// Run stages 2-5 over already-joined stores.
#[must_use]
pub fn rank(joined: Vec<StoreReviews>, limit: usize) -> Vec<TopStore> {
    let mut ranked: Vec<TopStore> = joined
        .into_iter()
        .filter(|entry| entry.reviews.len() >= MIN_REVIEWS_FOR_RANKING)
        .filter_map(|entry| {
            let average_rating = average_rating(&entry.reviews)?;
            Some(TopStore {
                name: entry.store.name,
                slug: entry.store.slug,
                photo: entry.store.photo,
                reviews: entry.reviews,
                average_rating,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
    ranked.truncate(limit);
    ranked
}

/// Compute the ranking from scratch.
///
/// # Errors
///
/// Returns `RepositoryError` if the join fails.
#[instrument(skip(repo))]
pub async fn top_stores(
    repo: &dyn CatalogRepository,
    limit: usize,
) -> Result<Vec<TopStore>, RepositoryError> {
    let joined = repo.reviewed_stores(MIN_REVIEWS_FOR_RANKING).await?;
    Ok(rank(joined, limit))
}
