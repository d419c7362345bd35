//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! sf-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFINDER_DATABASE_URL` - `PostgreSQL` connection string (falls back
//!   to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Catalog migrations: `crates/catalog/migrations/`

use tracing::info;

use storefinder_catalog::CatalogConfig;
use storefinder_catalog::db;

/// Apply every pending catalog migration.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = CatalogConfig::from_env()?;

    info!("Connecting to catalog database...");
    let pool = db::create_pool(&config.database_url).await?;

    info!("Running catalog migrations...");
    sqlx::migrate!("../catalog/migrations").run(&pool).await?;

    info!("Catalog migrations complete!");
    Ok(())
}
