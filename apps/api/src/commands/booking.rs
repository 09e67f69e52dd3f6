//! # Booking Commands
//!
//! The booking lifecycle as the HTTP collaborator sees it.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Booking Lifecycle                                    │
//! │                                                                         │
//! │   renter                 owner                  holder        owner     │
//! │     │                      │                      │             │       │
//! │  request_booking     confirm_booking         return_item   relist_item  │
//! │     │                      │                      │             │       │
//! │     ▼                      ▼                      ▼             ▼       │
//! │  Active ──► Pending ──────────► Rented ──────► Returned ──► Active     │
//! │                │                                                        │
//! │                └── reject_booking ──► Active                           │
//! │                                                                         │
//! │  Each arrow is one database transaction: listing status, booking       │
//! │  status and the notification commit together or not at all.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use crate::commands::checked;
use crate::error::ApiError;
use crate::state::AppState;
use renthub_core::validation::validate_id;
use renthub_core::{Booking, BookingDetail, BookingRequest, CallerIdentity, Listing};

/// Asks the owner for the item. Leaves the listing `Pending`.
///
/// `duration` defaults to 1 and `duration_unit` to `Per Hour`.
pub async fn request_booking(
    state: &AppState,
    caller: &CallerIdentity,
    request: BookingRequest,
) -> Result<Booking, ApiError> {
    debug!(caller_id = %caller.user_id, listing_id = %request.listing_id, "request_booking command");

    let result = state.db.lifecycle().request(caller, &request).await;
    checked("request_booking", &caller.user_id, &request.listing_id, result)
}

/// Owner accepts a pending request. Leaves the listing `Rented`.
pub async fn confirm_booking(
    state: &AppState,
    caller: &CallerIdentity,
    booking_id: &str,
) -> Result<Booking, ApiError> {
    validate_id("booking_id", booking_id)?;
    debug!(caller_id = %caller.user_id, booking_id = %booking_id, "confirm_booking command");

    let result = state.db.lifecycle().confirm(caller, booking_id).await;
    checked("confirm_booking", &caller.user_id, booking_id, result)
}

/// Owner declines a pending request. The listing is `Active` again.
pub async fn reject_booking(
    state: &AppState,
    caller: &CallerIdentity,
    booking_id: &str,
) -> Result<Booking, ApiError> {
    validate_id("booking_id", booking_id)?;
    debug!(caller_id = %caller.user_id, booking_id = %booking_id, "reject_booking command");

    let result = state.db.lifecycle().reject(caller, booking_id).await;
    checked("reject_booking", &caller.user_id, booking_id, result)
}

/// Holder hands the item back. Returning twice is a no-op.
pub async fn return_item(
    state: &AppState,
    caller: &CallerIdentity,
    listing_id: &str,
) -> Result<Listing, ApiError> {
    validate_id("listing_id", listing_id)?;
    debug!(caller_id = %caller.user_id, listing_id = %listing_id, "return_item command");

    let result = state.db.lifecycle().return_item(caller, listing_id).await;
    checked("return_item", &caller.user_id, listing_id, result)
}

/// Owner puts a returned item back on offer.
pub async fn relist_item(
    state: &AppState,
    caller: &CallerIdentity,
    listing_id: &str,
) -> Result<Listing, ApiError> {
    validate_id("listing_id", listing_id)?;
    debug!(caller_id = %caller.user_id, listing_id = %listing_id, "relist_item command");

    let result = state.db.lifecycle().relist(caller, listing_id).await;
    checked("relist_item", &caller.user_id, listing_id, result)
}

/// A booking on one of the caller's listings, with the renter's contact
/// details. Bookings on other owners' listings read as not found.
pub async fn booking_details(
    state: &AppState,
    caller: &CallerIdentity,
    booking_id: &str,
) -> Result<BookingDetail, ApiError> {
    validate_id("booking_id", booking_id)?;

    let result = state
        .db
        .bookings()
        .detail_for_owner(booking_id, &caller.user_id)
        .await;
    checked("booking_details", &caller.user_id, booking_id, result)
}
