//! Store Finder CLI - Database migrations, seeding and catalog queries.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! sf-cli migrate
//!
//! # Load sample data (or check it against an in-memory catalog)
//! sf-cli seed crates/cli/data/sample.yaml
//! sf-cli seed crates/cli/data/sample.yaml --dry-run
//!
//! # Query the catalog (JSON on stdout)
//! sf-cli tags --tag Wifi
//! sf-cli top
//! sf-cli search "coffee"
//! sf-cli near --lng -79.38 --lat 43.65
//! sf-cli page 2
//! sf-cli store cool-cafe
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Load users, stores and reviews from a YAML file
//! - `reindex` - Rebuild the text search index and report its size
//! - `tags`, `top`, `search`, `near`, `page`, `store` - Catalog queries
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (default: `storefinder_catalog=info,sf_cli=info`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(author, version, about = "Store Finder CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog from a YAML file
    Seed {
        /// Path to the seed file
        file: String,

        /// Load into an in-memory catalog instead of the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Rebuild the text search index from the database
    Reindex,
    /// List tags with their counts, and the stores for one tag
    Tags {
        /// Only list stores carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Show the top-rated stores
    Top,
    /// Full-text search over store names and descriptions
    Search {
        /// Free-text query
        query: String,
    },
    /// Stores near a point, nearest first
    Near {
        /// Longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: String,

        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: String,

        /// Search radius in meters (default from configuration)
        #[arg(long)]
        radius: Option<f64>,
    },
    /// One page of the store listing
    Page {
        /// 1-based page number
        #[arg(default_value_t = 1)]
        page: usize,
    },
    /// A store with its author and reviews
    Store {
        /// The store's slug
        slug: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storefinder_catalog=info,sf_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, dry_run } => commands::seed::run(&file, dry_run).await?,
        Commands::Reindex => commands::query::reindex().await?,
        Commands::Tags { tag } => commands::query::tags(tag.as_deref()).await?,
        Commands::Top => commands::query::top().await?,
        Commands::Search { query } => commands::query::search(&query).await?,
        Commands::Near { lng, lat, radius } => commands::query::near(lng, lat, radius).await?,
        Commands::Page { page } => commands::query::page(page).await?,
        Commands::Store { slug } => commands::query::store(&slug).await?,
    }
    Ok(())
}
