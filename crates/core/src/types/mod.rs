//! Core types for Store Finder.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod field_error;
pub mod geo;
pub mod id;
pub mod rating;
pub mod slug;

pub use email::{Email, EmailError};
pub use field_error::FieldError;
pub use geo::{BoundingBox, EARTH_RADIUS_METERS, GeoError, GeoPoint, Location};
pub use id::*;
pub use rating::{Rating, RatingError};
pub use slug::{Slug, SlugError};
