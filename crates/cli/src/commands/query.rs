//! Read-only catalog queries. Results are printed as JSON.

use tracing::info;

use storefinder_catalog::services::locator::NearQuery;
use storefinder_catalog::services::pagination::PageOutcome;

use super::{open_catalog, print_json};

/// Rebuild the search index and report how many stores it holds.
///
/// The index is in-memory and rebuilt whenever a catalog opens, so this
/// mainly checks that every stored store can be indexed.
///
/// # Errors
///
/// Returns an error if the catalog cannot be opened or indexed.
pub async fn reindex() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = open_catalog().await?;
    let count = catalog.reindex_search().await?;
    info!(count, "Search index rebuilt");
    Ok(())
}

/// # Errors
///
/// Returns an error if the catalog cannot be opened or queried.
pub async fn tags(tag: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = open_catalog().await?;
    print_json(&catalog.list_by_tag(tag).await?)?;
    Ok(())
}

/// # Errors
///
/// Returns an error if the catalog cannot be opened or queried.
pub async fn top() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = open_catalog().await?;
    print_json(&catalog.top_stores().await?)?;
    Ok(())
}

/// # Errors
///
/// Returns an error if the catalog cannot be opened or searched.
pub async fn search(query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = open_catalog().await?;
    print_json(&catalog.search_text(query).await?)?;
    Ok(())
}

/// # Errors
///
/// Returns an error if the catalog cannot be opened or queried.
pub async fn near(
    lng: String,
    lat: String,
    radius: Option<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = open_catalog().await?;
    let query = NearQuery {
        lng: Some(lng),
        lat: Some(lat),
        max_distance_meters: radius,
    };
    print_json(&catalog.near(&query).await?)?;
    Ok(())
}

/// # Errors
///
/// Returns an error if the catalog cannot be opened or queried.
pub async fn page(page: usize) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = open_catalog().await?;
    let outcome = catalog.list_page(page).await?;
    if let PageOutcome::Redirect { notice, .. } = &outcome {
        info!("{notice}");
    }
    print_json(&outcome)?;
    Ok(())
}

/// # Errors
///
/// Returns an error if the catalog cannot be opened or the store is unknown.
pub async fn store(slug: &str) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = open_catalog().await?;
    print_json(&catalog.store_by_slug(slug).await?)?;
    Ok(())
}
