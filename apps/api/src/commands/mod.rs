//! # Command Functions
//!
//! Every operation the HTTP collaborator exposes.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs          ◄─── You are here (exports)
//! ├── listing.rs      ◄─── Submit, browse, history, booked items
//! ├── booking.rs      ◄─── Booking lifecycle transitions
//! ├── notification.rs ◄─── Inbox and unread counters
//! └── profile.rs      ◄─── Profile edits
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  HTTP collaborator                                                      │
//! │  ─────────────────                                                      │
//! │  authenticate session ──► CallerIdentity                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rust Backend                                                           │
//! │  ────────────                                                           │
//! │  pub async fn confirm_booking(                                          │
//! │      state: &AppState,          ◄── Built once at startup              │
//! │      caller: &CallerIdentity,   ◄── Always explicit                    │
//! │      booking_id: &str,          ◄── From the request                   │
//! │  ) -> Result<Booking, ApiError>                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ApiResponse::from_result(..) ──► { success, message, data }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod booking;
pub mod listing;
pub mod notification;
pub mod profile;

use tracing::warn;

use crate::error::ApiError;
use renthub_db::DbResult;

/// Converts a storage result, logging transitions the caller was not
/// allowed to make.
///
/// Storage failures are already logged at `error!` by the conversion.
pub(crate) fn checked<T>(
    operation: &str,
    caller_id: &str,
    target_id: &str,
    result: DbResult<T>,
) -> Result<T, ApiError> {
    result.map_err(|e| {
        let err = ApiError::from(e);
        if err.code.is_rejection() {
            warn!(
                operation,
                caller_id = %caller_id,
                target_id = %target_id,
                code = ?err.code,
                reason = %err.message,
                "Transition rejected"
            );
        }
        err
    })
}
