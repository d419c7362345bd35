//! Search index builder.
//!
//! Loads every store from the repository and replaces the index contents.

use tracing::{info, instrument};

use super::SearchIndex;
use crate::db::CatalogRepository;
use crate::error::CatalogError;

/// Rebuild `index` from every store in `repo`. Returns the store count.
///
/// # Errors
///
/// Returns `CatalogError::Repository` if the stores cannot be loaded and
/// `CatalogError::Search` if indexing fails.
#[instrument(skip_all)]
pub async fn rebuild_from_repository(
    repo: &dyn CatalogRepository,
    index: &SearchIndex,
) -> Result<usize, CatalogError> {
    info!("Loading stores for search index");
    let stores = repo.list_stores(0, None).await?;

    let count = index.rebuild(&stores)?;
    info!(count, "Search index built successfully");

    Ok(count)
}
