//! Catalog-level error type.
//!
//! Every public [`crate::Catalog`] operation returns `Result<T, CatalogError>`.
//! Callers map the variants onto their own surface (HTTP status, CLI exit
//! code, form messages).

use thiserror::Error;

use storefinder_core::FieldError;

use crate::db::RepositoryError;
use crate::search::SearchError;

/// Application-level error type for the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// One or more input fields were rejected. Nothing was written.
    #[error("Validation failed: {}", join_messages(.0))]
    Validation(Vec<FieldError>),

    /// The acting user does not own the resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Search index operation failed.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}

impl CatalogError {
    /// The field errors, if this is a validation failure.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl From<Vec<FieldError>> for CatalogError {
    fn from(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
