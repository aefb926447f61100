//! # Error Types
//!
//! Domain-specific error types for lingua-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lingua-core errors (this file)                                        │
//! │  ├── CoreError        - Document could not be accepted                 │
//! │  └── ValidationError  - Field-level validation failures                │
//! │                                                                         │
//! │  lingua-db errors (separate crate)                                     │
//! │  └── DbError          - Storage / transaction failures                 │
//! │                                                                         │
//! │  content-api errors (in app)                                           │
//! │  └── ApiError         - What HTTP callers see (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError (400)                    │
//! │        DbError → ApiError (404 / 409 / 500)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything in this file is raised BEFORE a transaction opens, so no
//! storage state is ever touched by a document that fails here.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while turning caller input into a validated document.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The payload is not a well-formed lesson document.
    ///
    /// ## When This Occurs
    /// - Body is not JSON, or not a JSON object
    /// - A field has the wrong JSON type (string where a list is expected)
    /// - A required list-item field (e.g. `word`) is missing
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// `field` is a path into the document, e.g. `grammar.exercises[1].options[0].text`.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// A list holds more items than a single save may carry.
    #[error("{field} must have at most {max} items")]
    TooMany { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. non-numeric module id, NaN coordinate).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "vocabulary[0].word".to_string(),
        };
        assert_eq!(err.to_string(), "vocabulary[0].word is required");

        let err = ValidationError::TooMany {
            field: "quiz".to_string(),
            max: 500,
        };
        assert_eq!(err.to_string(), "quiz must have at most 500 items");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "title".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: title is required");
    }
}
