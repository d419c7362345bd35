//! Store Finder catalog engine.
//!
//! Users list places ("stores") with a location and tags, then find them by
//! tag, free text or proximity, review them and mark favorites. This crate
//! holds everything between the caller and storage:
//!
//! - [`validation`] - typed inputs and their field-error checks
//! - [`services`] - slug identity, tag index, locator, ranking, favorites and
//!   pagination
//! - [`search`] - the in-memory Tantivy text index
//! - [`db`] - the [`db::CatalogRepository`] trait with `PostgreSQL` and
//!   in-memory backends
//! - [`Catalog`] - the facade exposing every operation
//! - [`seed`] - bulk loading of sample data through the facade
//!
//! ```no_run
//! # async fn demo() -> Result<(), storefinder_catalog::CatalogError> {
//! use std::sync::Arc;
//!
//! use storefinder_catalog::db::InMemoryRepository;
//! use storefinder_catalog::{Catalog, CatalogSettings};
//!
//! let catalog = Catalog::open(Arc::new(InMemoryRepository::new()), CatalogSettings::default()).await?;
//! let tags = catalog.list_tags().await?;
//! assert!(tags.is_empty());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod search;
pub mod seed;
pub mod services;
pub mod validation;

pub use catalog::Catalog;
pub use config::{CatalogConfig, CatalogSettings, ConfigError};
pub use error::CatalogError;
