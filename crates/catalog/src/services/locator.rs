//! Radius lookups ordered by distance.

use serde::Deserialize;
use tracing::{debug, instrument};

use storefinder_core::GeoPoint;

use crate::db::{CatalogRepository, RepositoryError};
use crate::models::StoreSummary;

/// Raw proximity query, as it arrives from a query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NearQuery {
    pub lng: Option<String>,
    pub lat: Option<String>,
    /// Overrides the configured radius.
    #[serde(default, rename = "maxDistance")]
    pub max_distance_meters: Option<f64>,
}

impl NearQuery {
    /// A query for a known point.
    #[must_use]
    pub fn at(lng: f64, lat: f64) -> Self {
        Self {
            lng: Some(lng.to_string()),
            lat: Some(lat.to_string()),
            max_distance_meters: None,
        }
    }

    #[must_use]
    pub fn within(mut self, meters: f64) -> Self {
        self.max_distance_meters = Some(meters);
        self
    }
}

/// Stores strictly within the radius of the query point, nearest first.
///
/// An unusable query (missing, unparsable or out-of-range coordinates, or
/// a radius that is not a positive finite number) yields an empty list.
///
/// # Errors
///
/// Returns `RepositoryError` only if the lookup itself fails.
#[instrument(skip(repo))]
pub async fn near(
    repo: &dyn CatalogRepository,
    query: &NearQuery,
    default_radius_meters: f64,
    limit: usize,
) -> Result<Vec<StoreSummary>, RepositoryError> {
    let point = match GeoPoint::from_query(query.lng.as_deref(), query.lat.as_deref()) {
        Ok(point) => point,
        Err(e) => {
            debug!(error = %e, "Unusable proximity query");
            return Ok(Vec::new());
        }
    };

    let radius = query.max_distance_meters.unwrap_or(default_radius_meters);
    if !(radius.is_finite() && radius > 0.0) {
        debug!(radius, "Unusable proximity radius");
        return Ok(Vec::new());
    }

    let stores = repo.stores_near(point, radius, limit).await?;
    Ok(stores.into_iter().map(StoreSummary::from).collect())
}
