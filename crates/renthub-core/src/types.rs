//! # Domain Types
//!
//! Core domain types used throughout RentHub.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Listing      │   │     Booking     │   │  Notification   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  listing_id     │◄──│  booking_id?    │       │
//! │  │  owner_id       │   │  renter_id      │   │  user_id        │       │
//! │  │  status         │   │  status         │   │  kind           │       │
//! │  │  holder_id?     │   │  price_cents    │   │  is_read        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ ListingStatus   │   │ BookingStatus   │   │NotificationKind │       │
//! │  │  Active         │   │  Pending        │   │  BookingRequest │       │
//! │  │  Pending        │   │  Confirmed      │   │  BookingConfirm │       │
//! │  │  Rented         │   │  Completed      │   │  BookingReject  │       │
//! │  │  Returned       │   │  Rejected       │   │  ItemReturned   │       │
//! │  └─────────────────┘   └─────────────────┘   │  Message        │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Agreement
//! A listing's status always mirrors its open booking:
//! `Pending ⇔ Booking::Pending`, `Rented ⇔ Booking::Confirmed`,
//! `Returned ⇒ Booking::Completed`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Identity
// =============================================================================

/// The verified caller, supplied by the authenticated request layer.
///
/// Every lifecycle operation takes this explicitly; nothing in the core
/// reads ambient session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    pub user_id: String,
    pub fullname: String,
    pub email: Option<String>,
    pub phone: String,
    pub city: String,
}

/// A user's profile as mirrored from the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub fullname: String,
    pub email: Option<String>,
    pub phone: String,
    pub city: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Builds the identity the request layer should carry after a profile edit.
    pub fn to_identity(&self) -> CallerIdentity {
        CallerIdentity {
            user_id: self.id.clone(),
            fullname: self.fullname.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            city: self.city.clone(),
        }
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub fullname: String,
    pub phone: String,
    pub city: String,
}

// =============================================================================
// Listing Status
// =============================================================================

/// Availability of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
pub enum ListingStatus {
    /// Open for booking requests.
    Active,
    /// A renter's request awaits the owner's decision.
    Pending,
    /// Handed over to the holder.
    Rented,
    /// Handed back; terminal until the owner relists.
    Returned,
}

impl ListingStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "Active",
            ListingStatus::Pending => "Pending",
            ListingStatus::Rented => "Rented",
            ListingStatus::Returned => "Returned",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Booking Status
// =============================================================================

/// The status of a booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    /// Declined by the owner; the listing went back to `Active`.
    Rejected,
}

impl BookingStatus {
    /// Open bookings block any further request on the same listing.
    #[inline]
    pub const fn is_open(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Completed => "Completed",
            BookingStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Duration Unit
// =============================================================================

/// Unit a booking duration is counted in.
///
/// Serialized with the labels the web frontend already sends
/// (`"Per Hour"`, `"Per Day"`); stored as `per_hour` / `per_day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
pub enum DurationUnit {
    #[default]
    #[serde(rename = "Per Hour")]
    PerHour,
    #[serde(rename = "Per Day")]
    PerDay,
}

impl DurationUnit {
    pub const fn label(&self) -> &'static str {
        match self {
            DurationUnit::PerHour => "Per Hour",
            DurationUnit::PerDay => "Per Day",
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Input for submitting a new listing.
///
/// Image references come from the blob-storage collaborator; the core only
/// persists the list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub title: String,
    pub category: String,
    pub description: String,
    pub price_per_hour_cents: Option<i64>,
    pub price_per_day_cents: Option<i64>,
    pub deposit_cents: Option<i64>,
    #[ts(as = "Option<String>")]
    pub available_from: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub available_until: Option<NaiveDate>,
    pub conditions: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// An item offered for rent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub owner_id: String,

    /// Owner contact details, snapshotted from the caller at submission.
    pub owner_name: String,
    pub owner_contact: String,
    pub owner_email: Option<String>,
    pub location: String,

    pub title: String,
    pub category: String,
    pub description: String,
    pub price_per_hour_cents: Option<i64>,
    pub price_per_day_cents: Option<i64>,
    pub deposit_cents: Option<i64>,
    #[ts(as = "Option<String>")]
    pub available_from: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub available_until: Option<NaiveDate>,
    pub conditions: String,
    pub status: ListingStatus,

    /// Renter currently holding (or requesting) the item.
    pub holder_id: Option<String>,
    pub images: Vec<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    #[inline]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    #[inline]
    pub fn is_held_by(&self, user_id: &str) -> bool {
        self.holder_id.as_deref() == Some(user_id)
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.status == ListingStatus::Active
    }

    /// Rate a booking is priced at.
    ///
    /// The daily rate when set and non-zero, otherwise the hourly rate,
    /// otherwise zero. The booking's duration unit does not change it.
    pub fn booking_rate(&self) -> Money {
        let day = self.price_per_day_cents.filter(|c| *c > 0);
        Money::from_optional_cents(day.or(self.price_per_hour_cents))
    }
}

// =============================================================================
// Booking
// =============================================================================

/// What a renter sends when requesting an item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub listing_id: String,
    /// Defaults to one unit.
    pub duration: Option<i64>,
    /// Defaults to `Per Hour`.
    pub duration_unit: Option<DurationUnit>,
}

/// A ledger row ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub listing_id: String,
    pub renter_id: String,
    pub owner_id: String,
    pub price_cents: i64,
    pub duration: i64,
    pub duration_unit: DurationUnit,
}

/// A booking request and its lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub listing_id: String,
    pub renter_id: String,
    /// Denormalized from the listing when the request was made.
    pub owner_id: String,
    /// Agreed unit price in cents.
    pub price_cents: i64,
    pub duration: i64,
    pub duration_unit: DurationUnit,
    pub status: BookingStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Unit price × duration, `None` on overflow.
    pub fn total(&self) -> Option<Money> {
        self.price().checked_times(self.duration)
    }
}

/// Booking joined with its listing and renter, as the owner sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetail {
    pub booking_id: String,
    pub listing_id: String,
    pub price_cents: i64,
    pub duration: i64,
    pub duration_unit: DurationUnit,
    pub status: BookingStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub item_title: String,
    pub item_description: String,
    pub renter_name: String,
    pub renter_email: Option<String>,
    pub renter_phone: String,
}

/// One row of an owner's listing history (listing × its bookings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ListingHistoryEntry {
    #[serde(flatten)]
    pub listing: Listing,
    pub booking_id: Option<String>,
    pub booking_price_cents: Option<i64>,
    pub booking_duration: Option<i64>,
    pub booking_duration_unit: Option<DurationUnit>,
    pub booking_status: Option<BookingStatus>,
}

/// A listing the caller has rented (confirmed or completed booking).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookedItem {
    #[serde(flatten)]
    pub listing: Listing,
    pub booking_id: String,
    pub booking_price_cents: i64,
    pub booking_duration: i64,
    pub booking_duration_unit: DurationUnit,
    pub booking_status: BookingStatus,
}

// =============================================================================
// Notification
// =============================================================================

/// What a notification is about.
///
/// Replaces classification by message text: counters and retirement of
/// stale requests filter on this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Actionable: a renter wants the owner's item.
    BookingRequest,
    BookingConfirmed,
    BookingRejected,
    ItemReturned,
    /// Anything informational that is not tied to a transition.
    Message,
}

/// Which unread counter the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NotificationClass {
    /// Pending booking requests awaiting the owner's decision.
    Requests,
    /// Informational updates (returns, rejections, plain messages).
    Messages,
}

impl NotificationClass {
    /// Kinds counted by this class.
    ///
    /// Confirmations are shown on the renter's booked-items page, so neither
    /// badge counts them.
    pub const fn kinds(&self) -> &'static [NotificationKind] {
        match self {
            NotificationClass::Requests => &[NotificationKind::BookingRequest],
            NotificationClass::Messages => &[
                NotificationKind::BookingRejected,
                NotificationKind::ItemReturned,
                NotificationKind::Message,
            ],
        }
    }

    pub fn matches(&self, kind: NotificationKind) -> bool {
        self.kinds().contains(&kind)
    }
}

/// A notification row ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub booking_id: Option<String>,
    pub renter_id: Option<String>,
}

/// A notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub booking_id: Option<String>,
    pub renter_id: Option<String>,
    pub is_read: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
