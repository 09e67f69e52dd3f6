//! # API Error Type
//!
//! Unified error type for command functions.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in RentHub                                │
//! │                                                                         │
//! │  HTTP collaborator               Rust Backend                           │
//! │  ─────────────────               ────────────                           │
//! │                                                                         │
//! │  POST /bookings/:id/confirm                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Storage Error? ─── DbError::QueryFailed("...") ──┐             │  │
//! │  │         │                                         │             │  │
//! │  │         ▼                                         ▼             │  │
//! │  │  Rule Error? ─── CoreError::Forbidden(..) ──── ApiError ───────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ApiResponse::from_result(..)                                           │
//! │    { "success": false,                                                  │
//! │      "message": "Forbidden: Only the listing owner can confirm",        │
//! │      "code": "FORBIDDEN" }                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage internals never reach the caller: they are logged with
//! `tracing::error!` and replaced by a generic message.

use serde::Serialize;
use renthub_core::{CoreError, ValidationError};
use renthub_db::DbError;

/// API error returned from command functions.
///
/// ## Serialization
/// ```json
/// {
///   "code": "CONFLICT",
///   "message": "Conflict: Item not available"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// The HTTP collaborator maps these onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Caller lacks rights over the resource (403)
    Forbidden,

    /// Listing is not available for the requested transition (409)
    Conflict,

    /// Entity is in the wrong status for the operation (409)
    InvalidState,

    /// Input validation failed (400)
    ValidationError,

    /// Persistence failed (500)
    StorageFailure,

    /// Anything else (500)
    Internal,
}

impl ErrorCode {
    /// Whether the error is the caller's doing rather than ours.
    pub const fn is_rejection(&self) -> bool {
        !matches!(self, ErrorCode::StorageFailure | ErrorCode::Internal)
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    fn storage(message: &str) -> Self {
        ApiError::new(ErrorCode::StorageFailure, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(e) => ApiError::from(e),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::storage("Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::storage("Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::storage("Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::storage("Database transaction failed")
            }
            DbError::PoolExhausted => ApiError::storage("Database pool exhausted"),
            DbError::Decode(e) => {
                tracing::error!("Stored value could not be decoded: {}", e);
                ApiError::storage("Database operation failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::Internal, "Internal error")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::Forbidden(_) => ErrorCode::Forbidden,
            CoreError::Conflict(_) => ErrorCode::Conflict,
            CoreError::InvalidState { .. } => ErrorCode::InvalidState,
            CoreError::InvalidAmount(_) | CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Response Envelope
// =============================================================================

/// Uniform `{ success, message, data }` body handed to the HTTP collaborator.
///
/// `data` is omitted on failure; `code` is omitted on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            code: None,
            data: Some(data),
        }
    }

    pub fn failure(err: ApiError) -> Self {
        ApiResponse {
            success: false,
            message: err.message,
            code: Some(err.code),
            data: None,
        }
    }

    /// Wraps a command result, using `message` on success.
    pub fn from_result(result: Result<T, ApiError>, message: impl Into<String>) -> Self {
        match result {
            Ok(data) => ApiResponse::ok(message, data),
            Err(err) => ApiResponse::failure(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_keep_their_kind() {
        let cases = [
            (CoreError::not_found("Listing", "l-1"), ErrorCode::NotFound),
            (CoreError::forbidden("not yours"), ErrorCode::Forbidden),
            (CoreError::conflict("Item not available"), ErrorCode::Conflict),
            (
                CoreError::invalid_state("Booking", "b-1", "Confirmed", "confirm"),
                ErrorCode::InvalidState,
            ),
            (CoreError::InvalidAmount("overflow".into()), ErrorCode::ValidationError),
        ];

        for (err, code) in cases {
            let message = err.to_string();
            let api = ApiError::from(err);
            assert_eq!(api.code, code);
            assert_eq!(api.message, message);
        }
    }

    #[test]
    fn test_domain_errors_pass_through_db_layer() {
        let api = ApiError::from(DbError::from(CoreError::conflict("Item not available")));
        assert_eq!(api.code, ErrorCode::Conflict);
        assert!(api.message.contains("Item not available"));
    }

    #[test]
    fn test_storage_details_are_hidden() {
        let api = ApiError::from(DbError::QueryFailed("near \"SELEC\": syntax error".into()));
        assert_eq!(api.code, ErrorCode::StorageFailure);
        assert_eq!(api.message, "Database operation failed");
        assert!(!api.code.is_rejection());

        let api = ApiError::from(DbError::Internal("unexpected row shape".into()));
        assert_eq!(api.code, ErrorCode::Internal);
        assert_eq!(api.message, "Internal error");
        assert!(!api.code.is_rejection());
    }

    #[test]
    fn test_response_envelope() {
        let ok: ApiResponse<u32> = ApiResponse::from_result(Ok(3), "Counted");
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Counted");
        assert_eq!(json["data"], 3);
        assert!(json.get("code").is_none());

        let failed: ApiResponse<u32> =
            ApiResponse::from_result(Err(ApiError::not_found("Booking", "b-9")), "Counted");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Booking not found: b-9");
        assert_eq!(json["code"], "NOT_FOUND");
        assert!(json.get("data").is_none());
    }
}
