//! Seed the catalog with users, stores and reviews from a YAML file.
//!
//! Records go through the same validation and slug assignment as live
//! writes. `--dry-run` loads the file into an in-memory catalog, which
//! checks it without touching the database.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use storefinder_catalog::db::InMemoryRepository;
use storefinder_catalog::seed::{self, SeedData};
use storefinder_catalog::{Catalog, CatalogSettings};

/// Seed from `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or any record
/// fails to write.
pub async fn run(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed data from file");
    let content = tokio::fs::read_to_string(path).await?;
    let data: SeedData = serde_yaml::from_str(&content)?;
    info!(
        users = data.users.len(),
        stores = data.stores.len(),
        "Parsed seed file"
    );

    let catalog = if dry_run {
        info!("Dry run: seeding an in-memory catalog");
        Catalog::open(Arc::new(InMemoryRepository::new()), CatalogSettings::default()).await?
    } else {
        super::open_catalog().await?
    };

    let summary = seed::apply(&catalog, &data).await?;

    info!("Seeding complete!");
    info!("  Users inserted: {}", summary.users);
    info!("  Stores inserted: {}", summary.stores);
    info!("  Reviews inserted: {}", summary.reviews);

    Ok(())
}
