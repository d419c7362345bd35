//! Store Finder Core - Shared types library.
//!
//! This crate provides common types used across all Store Finder components:
//! - `catalog` - Catalog query and ranking engine
//! - `cli` - Command-line tools for migrations, seeding and queries
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, slugs, ratings
//!   and geographic coordinates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
