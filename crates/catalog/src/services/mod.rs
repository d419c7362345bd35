//! The catalog's query and ranking components.
//!
//! Each module is a set of functions over a [`crate::db::CatalogRepository`]
//! plus the pure stages they are built from, so the stages can be tested
//! without storage. [`crate::Catalog`] wires them together.
//!
//! - [`identity`] - slug assignment with collision counting
//! - [`tags`] - tag frequencies and tag-scoped listings
//! - [`locator`] - radius lookups ordered by distance
//! - [`ranking`] - the top-stores pipeline
//! - [`favorites`] - heart toggling
//! - [`pagination`] - page-bounded listing with overflow redirect

pub mod favorites;
pub mod identity;
pub mod locator;
pub mod pagination;
pub mod ranking;
pub mod tags;
