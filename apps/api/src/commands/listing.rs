//! # Listing Commands
//!
//! Submitting items and the read-only views over listings.
//!
//! ## Browse Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Listing Views                                        │
//! │                                                                         │
//! │  list_available   ── Active listings, caller's own excluded            │
//! │  get_listing      ── One listing, any status                           │
//! │  listing_history  ── Caller's listings × their bookings                │
//! │  booked_items     ── Listings the caller rented (confirmed/completed)  │
//! │  has_listing      ── Whether the caller ever listed anything           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Instant;
use tracing::{debug, info};

use crate::commands::checked;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::state::AppState;
use renthub_core::validation::validate_id;
use renthub_core::{
    BookedItem, CallerIdentity, Listing, ListingHistoryEntry, NewListing, ValidationError,
};

/// Checks image references against the deployment's upload settings.
///
/// The blob-storage collaborator has already stored the files; only the
/// references it produced are accepted.
fn check_images(config: &AppConfig, images: &[String]) -> Result<(), ValidationError> {
    if images.len() > config.max_images {
        return Err(ValidationError::TooMany {
            field: "images".to_string(),
            max: config.max_images,
        });
    }

    let prefix = format!("{}/", config.upload_prefix.trim_end_matches('/'));
    if let Some(bad) = images.iter().find(|image| !image.starts_with(&prefix)) {
        return Err(ValidationError::InvalidFormat {
            field: "images".to_string(),
            reason: format!("'{}' is not under {}", bad, config.upload_prefix),
        });
    }

    Ok(())
}

/// Publishes a new `Active` listing owned by the caller.
///
/// Owner name, phone, email and city are snapshotted from `caller`.
pub async fn submit_listing(
    state: &AppState,
    caller: &CallerIdentity,
    input: NewListing,
) -> Result<Listing, ApiError> {
    debug!(caller_id = %caller.user_id, title = %input.title, "submit_listing command");

    check_images(&state.config, &input.images)?;

    let result = state.db.listings().create(caller, &input).await;
    let listing = checked("submit_listing", &caller.user_id, "-", result)?;

    info!(listing_id = %listing.id, owner_id = %listing.owner_id, "Listing submitted");
    Ok(listing)
}

/// Listings the caller can request, newest first.
pub async fn list_available(
    state: &AppState,
    caller: &CallerIdentity,
) -> Result<Vec<Listing>, ApiError> {
    let start = Instant::now();

    let listings = state.db.listings().find_available(&caller.user_id).await?;

    debug!(
        caller_id = %caller.user_id,
        results = listings.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "list_available completed"
    );

    Ok(listings)
}

/// Fetches a single listing by ID.
pub async fn get_listing(state: &AppState, listing_id: &str) -> Result<Listing, ApiError> {
    validate_id("listing_id", listing_id)?;

    state
        .db
        .listings()
        .find_by_id(listing_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Listing", listing_id))
}

/// The caller's listings, each joined with its bookings (one row per booking,
/// one row with no booking fields for never-requested listings).
pub async fn listing_history(
    state: &AppState,
    caller: &CallerIdentity,
) -> Result<Vec<ListingHistoryEntry>, ApiError> {
    Ok(state.db.listings().history_for_owner(&caller.user_id).await?)
}

/// Listings the caller has rented.
pub async fn booked_items(
    state: &AppState,
    caller: &CallerIdentity,
) -> Result<Vec<BookedItem>, ApiError> {
    Ok(state.db.listings().booked_by(&caller.user_id).await?)
}

/// Whether the caller owns at least one listing.
pub async fn has_listing(state: &AppState, caller: &CallerIdentity) -> Result<bool, ApiError> {
    Ok(state.db.listings().count_by_owner(&caller.user_id).await? > 0)
}
