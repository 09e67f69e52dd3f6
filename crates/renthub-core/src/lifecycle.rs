//! # Booking Lifecycle Rules
//!
//! The pure half of the booking state machine: who may trigger which
//! transition, from which status, at what price, and what the resulting
//! notifications say. The database layer runs these checks inside its
//! transactions; nothing here touches I/O.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Listing:  Active ──request──► Pending ──confirm──► Rented             │
//! │   Booking:    -                 Pending              Confirmed          │
//! │               ▲                    │                    │               │
//! │               │                 reject               return             │
//! │               │                    │                    ▼               │
//! │               └────────────────────┘                 Returned           │
//! │               │                 Rejected             Completed          │
//! │               │                                         │               │
//! │               └──────────────────relist─────────────────┘               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Booking, BookingStatus, DurationUnit, Listing, ListingStatus};

/// Message returned when a listing cannot take a new request.
pub const ITEM_NOT_AVAILABLE: &str = "Item not available";

// =============================================================================
// Request
// =============================================================================

/// Checks that `renter_id` may request `listing` right now.
pub fn ensure_can_request(listing: &Listing, renter_id: &str) -> CoreResult<()> {
    if listing.is_owned_by(renter_id) {
        return Err(CoreError::forbidden("You cannot book your own listing"));
    }
    if !listing.is_available() {
        return Err(CoreError::conflict(ITEM_NOT_AVAILABLE));
    }
    Ok(())
}

/// Agreed price for a request, frozen onto the booking.
///
/// Always the listing's booking rate; hourly and daily requests are priced
/// alike.
pub fn agreed_price(listing: &Listing) -> Money {
    listing.booking_rate()
}

// =============================================================================
// Owner decisions (confirm / reject)
// =============================================================================

/// Owner-side decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Reject,
}

impl Decision {
    pub const fn verb(&self) -> &'static str {
        match self {
            Decision::Confirm => "confirm",
            Decision::Reject => "reject",
        }
    }

    /// Listing status after the decision is applied.
    pub const fn listing_status(&self) -> ListingStatus {
        match self {
            Decision::Confirm => ListingStatus::Rented,
            Decision::Reject => ListingStatus::Active,
        }
    }

    /// Booking status after the decision is applied.
    pub const fn booking_status(&self) -> BookingStatus {
        match self {
            Decision::Confirm => BookingStatus::Confirmed,
            Decision::Reject => BookingStatus::Rejected,
        }
    }
}

/// Checks that `caller_id` owns the listing and the booking still awaits a decision.
///
/// Ownership is checked first: a stranger learns nothing about the
/// booking's status.
pub fn ensure_can_decide(
    listing_owner_id: &str,
    booking: &Booking,
    caller_id: &str,
    decision: Decision,
) -> CoreResult<()> {
    if listing_owner_id != caller_id {
        return Err(CoreError::forbidden("You do not own this rental"));
    }
    if booking.status != BookingStatus::Pending {
        return Err(CoreError::invalid_state(
            "Booking",
            &booking.id,
            booking.status,
            decision.verb(),
        ));
    }
    Ok(())
}

// =============================================================================
// Return
// =============================================================================

/// What a return request should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnPlan {
    /// Listing is rented to the caller: mark returned and complete the booking.
    MarkReturned,
    /// A previous return already went through; succeed without changes.
    AlreadyReturned,
}

/// Decides how to handle a return of `listing` by `caller_id`.
pub fn plan_return(listing: &Listing, caller_id: &str) -> CoreResult<ReturnPlan> {
    if !listing.is_held_by(caller_id) {
        return Err(CoreError::forbidden("Rental not rented by you"));
    }
    match listing.status {
        ListingStatus::Rented => Ok(ReturnPlan::MarkReturned),
        ListingStatus::Returned => Ok(ReturnPlan::AlreadyReturned),
        status @ (ListingStatus::Active | ListingStatus::Pending) => Err(
            CoreError::invalid_state("Listing", &listing.id, status, "return"),
        ),
    }
}

// =============================================================================
// Relist
// =============================================================================

/// Checks that the owner may put a returned item back on the market.
pub fn ensure_can_relist(listing: &Listing, caller_id: &str) -> CoreResult<()> {
    if !listing.is_owned_by(caller_id) {
        return Err(CoreError::forbidden("You do not own this rental"));
    }
    if listing.status != ListingStatus::Returned {
        return Err(CoreError::invalid_state(
            "Listing",
            &listing.id,
            listing.status,
            "relist",
        ));
    }
    Ok(())
}

// =============================================================================
// Notification text
// =============================================================================

pub fn request_message(renter_name: &str, title: &str, duration: i64, unit: DurationUnit) -> String {
    format!(
        "Renter {} has requested to book your item '{}' for {} {}.",
        renter_name, title, duration, unit
    )
}

pub fn confirmed_message(title: &str) -> String {
    format!("Your booking for '{}' has been confirmed by the owner!", title)
}

pub fn rejected_message(title: &str) -> String {
    format!("Your booking request for '{}' has been declined by the owner.", title)
}

pub fn returned_message(title: &str, renter_name: &str) -> String {
    format!("Your item '{}' has been returned by {}.", title, renter_name)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn listing(status: ListingStatus, holder: Option<&str>) -> Listing {
        let now = Utc::now();
        Listing {
            id: "l-1".to_string(),
            owner_id: "owner".to_string(),
            owner_name: "Olive Owner".to_string(),
            owner_contact: "555-0100".to_string(),
            owner_email: None,
            location: "Karachi".to_string(),
            title: "Camping Tent".to_string(),
            category: "Outdoor".to_string(),
            description: String::new(),
            price_per_hour_cents: Some(300),
            price_per_day_cents: Some(2500),
            deposit_cents: Some(5000),
            available_from: None,
            available_until: None,
            conditions: String::new(),
            status,
            holder_id: holder.map(str::to_string),
            images: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn booking(status: BookingStatus) -> Booking {
        let now = Utc::now();
        Booking {
            id: "b-1".to_string(),
            listing_id: "l-1".to_string(),
            renter_id: "renter".to_string(),
            owner_id: "owner".to_string(),
            price_cents: 300,
            duration: 2,
            duration_unit: DurationUnit::PerHour,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_request_rules() {
        let active = listing(ListingStatus::Active, None);
        assert!(ensure_can_request(&active, "renter").is_ok());
        assert!(matches!(
            ensure_can_request(&active, "owner"),
            Err(CoreError::Forbidden(_))
        ));

        let pending = listing(ListingStatus::Pending, Some("someone"));
        assert_eq!(
            ensure_can_request(&pending, "renter"),
            Err(CoreError::Conflict(ITEM_NOT_AVAILABLE.to_string()))
        );
    }

    #[test]
    fn test_decision_rules() {
        let pending = booking(BookingStatus::Pending);
        assert!(ensure_can_decide("owner", &pending, "owner", Decision::Confirm).is_ok());
        assert!(matches!(
            ensure_can_decide("owner", &pending, "intruder", Decision::Confirm),
            Err(CoreError::Forbidden(_))
        ));

        let confirmed = booking(BookingStatus::Confirmed);
        assert!(matches!(
            ensure_can_decide("owner", &confirmed, "owner", Decision::Reject),
            Err(CoreError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_decision_targets() {
        assert_eq!(Decision::Confirm.listing_status(), ListingStatus::Rented);
        assert_eq!(Decision::Confirm.booking_status(), BookingStatus::Confirmed);
        assert_eq!(Decision::Reject.listing_status(), ListingStatus::Active);
        assert_eq!(Decision::Reject.booking_status(), BookingStatus::Rejected);
    }

    #[test]
    fn test_return_plan() {
        let rented = listing(ListingStatus::Rented, Some("renter"));
        assert_eq!(plan_return(&rented, "renter"), Ok(ReturnPlan::MarkReturned));
        assert!(matches!(plan_return(&rented, "other"), Err(CoreError::Forbidden(_))));

        let returned = listing(ListingStatus::Returned, Some("renter"));
        assert_eq!(plan_return(&returned, "renter"), Ok(ReturnPlan::AlreadyReturned));

        let pending = listing(ListingStatus::Pending, Some("renter"));
        assert!(matches!(
            plan_return(&pending, "renter"),
            Err(CoreError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_relist_rules() {
        let returned = listing(ListingStatus::Returned, Some("renter"));
        assert!(ensure_can_relist(&returned, "owner").is_ok());
        assert!(matches!(ensure_can_relist(&returned, "renter"), Err(CoreError::Forbidden(_))));

        let rented = listing(ListingStatus::Rented, Some("renter"));
        assert!(matches!(
            ensure_can_relist(&rented, "owner"),
            Err(CoreError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_agreed_price_ignores_duration_unit() {
        let mut l = listing(ListingStatus::Active, None);
        assert_eq!(agreed_price(&l).cents(), 2500);

        l.price_per_day_cents = None;
        assert_eq!(agreed_price(&l).cents(), 300);

        l.price_per_hour_cents = None;
        assert!(agreed_price(&l).is_zero());
    }

    #[test]
    fn test_messages() {
        let msg = request_message("Rafi", "Camping Tent", 2, DurationUnit::PerHour);
        assert_eq!(
            msg,
            "Renter Rafi has requested to book your item 'Camping Tent' for 2 Per Hour."
        );
        assert!(confirmed_message("Camping Tent").contains("has been confirmed"));
        assert!(returned_message("Camping Tent", "Rafi").contains("has been returned"));
        assert!(rejected_message("Camping Tent").contains("declined"));
    }
}
