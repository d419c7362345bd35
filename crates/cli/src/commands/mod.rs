//! Sub-command implementations.

pub mod migrate;
pub mod query;
pub mod seed;

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use storefinder_catalog::db::{self, PgCatalogRepository};
use storefinder_catalog::{Catalog, CatalogConfig};

/// Open a catalog over the configured database.
async fn open_catalog() -> Result<Catalog, Box<dyn std::error::Error>> {
    let config = CatalogConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    info!("Connected to database");

    let repo = Arc::new(PgCatalogRepository::new(pool));
    Ok(Catalog::open(repo, config.settings).await?)
}

/// Write `value` to stdout as pretty JSON.
fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    let json = serde_json::to_string_pretty(value)?;
    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}
