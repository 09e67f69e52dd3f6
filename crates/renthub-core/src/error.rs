//! # Error Types
//!
//! Domain-specific error types for renthub-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  renthub-core errors (this file)                                       │
//! │  ├── CoreError        - Lifecycle rule violations                      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  renthub-db errors (separate crate)                                    │
//! │  └── DbError          - Storage failures, wraps CoreError              │
//! │                                                                         │
//! │  renthub-api errors                                                    │
//! │  └── ApiError         - { code, message } seen by the HTTP layer       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Booking lifecycle and domain rule errors.
///
/// Every variant maps one-to-one to an error kind the caller can act on:
/// missing entity, missing rights, unavailable item, wrong status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Referenced entity is absent.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Caller lacks rights over the entity.
    ///
    /// ## When This Occurs
    /// - Confirming or rejecting a booking on someone else's listing
    /// - Returning an item the caller does not hold
    /// - Marking another user's notification as read
    /// - Booking your own listing
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A state precondition on the listing was violated.
    ///
    /// ## User Workflow
    /// ```text
    /// Renter A: request ──► listing Active → Pending ✓
    /// Renter B: request ──► listing is Pending
    ///      │
    ///      ▼
    /// Conflict("Item not available")
    /// ```
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The entity is not in the status the requested transition needs.
    #[error("{entity} {id} is {status}, cannot {action}")]
    InvalidState {
        entity: String,
        id: String,
        status: String,
        action: String,
    },

    /// A computed amount is out of range (e.g. overflowing booking total).
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for an entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an InvalidState error.
    pub fn invalid_state(
        entity: impl Into<String>,
        id: impl Into<String>,
        status: impl ToString,
        action: impl Into<String>,
    ) -> Self {
        CoreError::InvalidState {
            entity: entity.into(),
            id: id.into(),
            status: status.to_string(),
            action: action.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        CoreError::Forbidden(reason.into())
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        CoreError::Conflict(reason.into())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any transaction is opened, so a rejected input never
/// costs a database round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, inverted date range).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Collection has too many entries.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },
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
    fn test_error_messages() {
        let err = CoreError::not_found("Listing", "abc");
        assert_eq!(err.to_string(), "Listing not found: abc");

        let err = CoreError::invalid_state("Booking", "b-1", "confirmed", "confirm");
        assert_eq!(err.to_string(), "Booking b-1 is confirmed, cannot confirm");

        let err = CoreError::conflict("Item not available");
        assert_eq!(err.to_string(), "Conflict: Item not available");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "title".to_string(),
        };
        assert_eq!(err.to_string(), "title is required");

        let err = ValidationError::TooMany {
            field: "images".to_string(),
            max: 5,
        };
        assert_eq!(err.to_string(), "images cannot have more than 5 entries");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "duration".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
