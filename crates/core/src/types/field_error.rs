//! Per-field validation messages.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A validation failure attached to one input field.
///
/// Validation collects every failing field instead of stopping at the first
/// one, so callers can show all messages next to their form inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending input field (e.g. `"email"`).
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
