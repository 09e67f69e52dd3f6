//! # Booking Lifecycle Manager
//!
//! Runs every booking transition as one database transaction across the
//! listing store, the booking ledger and the notification dispatcher.
//!
//! ## Transaction Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One transition = one transaction                     │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │    1. first statement is a write (guard update or touch)               │
//! │       → takes the SQLite write lock, competing writers wait            │
//! │    2. mirror the caller's profile into users (first sight only)        │
//! │    3. read current state                                               │
//! │    4. renthub_core::lifecycle rule (who may act, from which status)    │
//! │    5. listing  UPDATE                                                  │
//! │    6. booking  INSERT / UPDATE                                         │
//! │    7. notification INSERT (+ retire stale request notification)        │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Any `?` before COMMIT drops the sqlx Transaction → ROLLBACK.          │
//! │  Callers see either every effect or none.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Mutual Exclusion
//! Request starts with
//! `UPDATE listings SET status = 'pending' ... WHERE id = ? AND status = 'active'`.
//! Of two concurrent requests for one listing exactly one changes a row;
//! the other, once the winner commits, changes nothing and reports
//! `Conflict("Item not available")`.
//!
//! ## Names In Messages
//! Notification text uses the name stored in `users`, not the one carried
//! by the caller's session, so a renamed user is shown by their new name.

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::booking::BookingRepository;
use crate::repository::listing::ListingRepository;
use crate::repository::notification::NotificationRepository;
use crate::repository::user::UserRepository;
use renthub_core::lifecycle::{
    agreed_price, confirmed_message, ensure_can_decide, ensure_can_relist, ensure_can_request,
    plan_return, rejected_message, request_message, returned_message, Decision, ReturnPlan,
    ITEM_NOT_AVAILABLE,
};
use renthub_core::validation::{validate_duration, validate_id};
use renthub_core::{
    Booking, BookingRequest, CallerIdentity, CoreError, Listing, ListingStatus, NewBooking,
    NewNotification, NotificationKind, DEFAULT_BOOKING_DURATION,
};

/// Coordinates multi-table booking transitions.
#[derive(Debug, Clone)]
pub struct BookingLifecycle {
    pool: SqlitePool,
}

impl BookingLifecycle {
    /// Creates a new BookingLifecycle.
    pub fn new(pool: SqlitePool) -> Self {
        BookingLifecycle { pool }
    }

    async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool.begin().await.map_err(DbError::transaction)
    }

    // =========================================================================
    // Request
    // =========================================================================

    /// A renter asks for a listing.
    ///
    /// ## Effects (all or nothing)
    /// - listing `Active → Pending`, holder = renter
    /// - new `Pending` booking at the listing's booking rate
    /// - `booking_request` notification to the owner
    ///
    /// ## Errors
    /// - `Validation` for a bad id or duration (nothing opened)
    /// - `NotFound` if the listing does not exist
    /// - `Forbidden` if the caller owns the listing
    /// - `Conflict("Item not available")` if the listing is not `Active`
    pub async fn request(&self, caller: &CallerIdentity, request: &BookingRequest) -> DbResult<Booking> {
        validate_id("listing_id", &request.listing_id).map_err(CoreError::from)?;
        let duration = request.duration.unwrap_or(DEFAULT_BOOKING_DURATION);
        validate_duration(duration).map_err(CoreError::from)?;
        let unit = request.duration_unit.unwrap_or_default();
        let renter_id = caller.user_id.as_str();
        let listing_id = request.listing_id.as_str();

        let mut tx = self.begin().await?;

        let claimed = ListingRepository::transition(
            &mut tx,
            listing_id,
            ListingStatus::Active,
            ListingStatus::Pending,
            Some(renter_id),
        )
        .await?;

        if claimed == 0 {
            let listing = ListingRepository::find_by_id_in(&mut tx, listing_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Listing", listing_id))?;
            ensure_can_request(&listing, renter_id)?;
            return Err(CoreError::conflict(ITEM_NOT_AVAILABLE).into());
        }

        let renter = UserRepository::ensure_profile(&mut tx, caller).await?;

        let listing = ListingRepository::find_by_id_in(&mut tx, listing_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Listing", listing_id))?;

        let price = agreed_price(&listing);
        if price.checked_times(duration).is_none() {
            return Err(CoreError::InvalidAmount(format!(
                "{} x {} overflows",
                price, duration
            ))
            .into());
        }

        let booking = BookingRepository::create_request(
            &mut tx,
            &NewBooking {
                listing_id: listing.id.clone(),
                renter_id: renter_id.to_string(),
                owner_id: listing.owner_id.clone(),
                price_cents: price.cents(),
                duration,
                duration_unit: unit,
            },
        )
        .await?;

        NotificationRepository::notify(
            &mut tx,
            &NewNotification {
                user_id: listing.owner_id.clone(),
                kind: NotificationKind::BookingRequest,
                message: request_message(&renter.fullname, &listing.title, duration, unit),
                booking_id: Some(booking.id.clone()),
                renter_id: Some(renter_id.to_string()),
            },
        )
        .await?;

        tx.commit().await.map_err(DbError::transaction)?;

        info!(
            booking_id = %booking.id,
            listing_id = %listing.id,
            renter_id = %renter_id,
            price = %price,
            "Booking requested"
        );

        Ok(booking)
    }

    // =========================================================================
    // Confirm / Reject
    // =========================================================================

    /// The owner accepts a pending request.
    ///
    /// Listing → `Rented` (holder = renter), booking → `Confirmed`, renter
    /// notified, owner's request notification retired.
    pub async fn confirm(&self, caller: &CallerIdentity, booking_id: &str) -> DbResult<Booking> {
        self.decide(caller, booking_id, Decision::Confirm).await
    }

    /// The owner declines a pending request.
    ///
    /// Listing → `Active` (holder cleared), booking → `Rejected`, renter
    /// notified, owner's request notification retired.
    pub async fn reject(&self, caller: &CallerIdentity, booking_id: &str) -> DbResult<Booking> {
        self.decide(caller, booking_id, Decision::Reject).await
    }

    async fn decide(
        &self,
        caller: &CallerIdentity,
        booking_id: &str,
        decision: Decision,
    ) -> DbResult<Booking> {
        let mut tx = self.begin().await?;

        if BookingRepository::touch(&mut tx, booking_id).await? == 0 {
            return Err(CoreError::not_found("Booking", booking_id).into());
        }
        UserRepository::ensure_profile(&mut tx, caller).await?;

        let row = BookingRepository::find_with_listing(&mut tx, booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Booking", booking_id))?;
        ensure_can_decide(&row.listing_owner_id, &row.booking, &caller.user_id, decision)?;

        let renter_id = row.booking.renter_id.as_str();
        let (holder, kind, message) = match decision {
            Decision::Confirm => (
                Some(renter_id),
                NotificationKind::BookingConfirmed,
                confirmed_message(&row.listing_title),
            ),
            Decision::Reject => (
                None,
                NotificationKind::BookingRejected,
                rejected_message(&row.listing_title),
            ),
        };

        ListingRepository::set_status(
            &mut tx,
            &row.booking.listing_id,
            decision.listing_status(),
            holder,
        )
        .await?;

        match decision {
            Decision::Confirm => BookingRepository::confirm(&mut tx, booking_id).await?,
            Decision::Reject => BookingRepository::reject(&mut tx, booking_id).await?,
        }

        NotificationRepository::notify(
            &mut tx,
            &NewNotification {
                user_id: renter_id.to_string(),
                kind,
                message,
                booking_id: Some(booking_id.to_string()),
                renter_id: Some(renter_id.to_string()),
            },
        )
        .await?;

        NotificationRepository::retire_request_notification(&mut tx, &caller.user_id, booking_id)
            .await?;

        let booking = BookingRepository::find_by_id_in(&mut tx, booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Booking", booking_id))?;

        tx.commit().await.map_err(DbError::transaction)?;

        info!(
            booking_id = %booking.id,
            listing_id = %booking.listing_id,
            owner_id = %caller.user_id,
            status = %booking.status,
            "Booking {}ed",
            decision.verb()
        );

        Ok(booking)
    }

    // =========================================================================
    // Return
    // =========================================================================

    /// The holder hands a rented item back.
    ///
    /// Listing → `Returned`, the matching `Confirmed` booking → `Completed`
    /// (a missing booking is tolerated), owner notified with
    /// `item_returned`. Returning an already returned item succeeds again
    /// without writing anything.
    pub async fn return_item(&self, caller: &CallerIdentity, listing_id: &str) -> DbResult<Listing> {
        let mut tx = self.begin().await?;

        if ListingRepository::touch(&mut tx, listing_id).await? == 0 {
            return Err(CoreError::not_found("Listing", listing_id).into());
        }
        let renter = UserRepository::ensure_profile(&mut tx, caller).await?;

        let listing = ListingRepository::find_by_id_in(&mut tx, listing_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Listing", listing_id))?;

        match plan_return(&listing, &caller.user_id)? {
            ReturnPlan::AlreadyReturned => {
                // Dropping tx rolls back the touch
                debug!(listing_id = %listing_id, "Item already returned");
                return Ok(listing);
            }
            ReturnPlan::MarkReturned => {}
        }

        let booking = BookingRepository::find_confirmed(&mut tx, listing_id, &caller.user_id).await?;

        ListingRepository::set_status(
            &mut tx,
            listing_id,
            ListingStatus::Returned,
            Some(&caller.user_id),
        )
        .await?;

        let completed = BookingRepository::complete(&mut tx, listing_id, &caller.user_id).await?;
        if completed == 0 {
            debug!(listing_id = %listing_id, "No confirmed booking to complete");
        }

        NotificationRepository::notify(
            &mut tx,
            &NewNotification {
                user_id: listing.owner_id.clone(),
                kind: NotificationKind::ItemReturned,
                message: returned_message(&listing.title, &renter.fullname),
                booking_id: booking.map(|b| b.id),
                renter_id: Some(caller.user_id.clone()),
            },
        )
        .await?;

        let returned = ListingRepository::find_by_id_in(&mut tx, listing_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Listing", listing_id))?;

        tx.commit().await.map_err(DbError::transaction)?;

        info!(
            listing_id = %listing_id,
            renter_id = %caller.user_id,
            completed_bookings = completed,
            "Item returned"
        );

        Ok(returned)
    }

    // =========================================================================
    // Relist
    // =========================================================================

    /// The owner puts a returned item back on the market.
    pub async fn relist(&self, caller: &CallerIdentity, listing_id: &str) -> DbResult<Listing> {
        let mut tx = self.begin().await?;

        if ListingRepository::touch(&mut tx, listing_id).await? == 0 {
            return Err(CoreError::not_found("Listing", listing_id).into());
        }
        UserRepository::ensure_profile(&mut tx, caller).await?;

        let listing = ListingRepository::find_by_id_in(&mut tx, listing_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Listing", listing_id))?;
        ensure_can_relist(&listing, &caller.user_id)?;

        ListingRepository::set_status(&mut tx, listing_id, ListingStatus::Active, None).await?;

        let relisted = ListingRepository::find_by_id_in(&mut tx, listing_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Listing", listing_id))?;

        tx.commit().await.map_err(DbError::transaction)?;

        info!(listing_id = %listing_id, owner_id = %caller.user_id, "Listing relisted");

        Ok(relisted)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::test_support::{database, identity, register_users, tent, OTHER, OWNER, RENTER};
    use renthub_core::{BookingStatus, DurationUnit, NotificationClass, ProfileUpdate};

    fn request_for(listing_id: &str) -> BookingRequest {
        BookingRequest {
            listing_id: listing_id.to_string(),
            duration: Some(2),
            duration_unit: Some(DurationUnit::PerDay),
        }
    }

    /// Listing status agrees with its open booking.
    async fn assert_consistent(db: &Database, listing_id: &str) {
        let listing = db.listings().find_by_id(listing_id).await.unwrap().unwrap();
        let bookings = db.bookings().find_by_listing(listing_id).await.unwrap();
        let open: Vec<_> = bookings.iter().filter(|b| b.status.is_open()).collect();
        assert!(open.len() <= 1, "more than one open booking");

        match listing.status {
            ListingStatus::Active => assert!(open.is_empty()),
            ListingStatus::Pending => {
                assert_eq!(open.len(), 1);
                assert_eq!(open[0].status, BookingStatus::Pending);
            }
            ListingStatus::Rented => {
                assert_eq!(open.len(), 1);
                assert_eq!(open[0].status, BookingStatus::Confirmed);
            }
            ListingStatus::Returned => {
                assert!(open.is_empty());
                assert!(bookings.iter().any(|b| b.status == BookingStatus::Completed));
            }
        }
    }

    #[tokio::test]
    async fn test_request_scenario() {
        let db = database().await;
        let listing = db.listings().create(&identity(OWNER), &tent()).await.unwrap();

        let booking = db
            .lifecycle()
            .request(&identity(RENTER), &request_for(&listing.id))
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.price_cents, 2500);
        assert_eq!(booking.owner_id, OWNER);

        let stored = db.listings().find_by_id(&listing.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ListingStatus::Pending);
        assert_eq!(stored.holder_id.as_deref(), Some(RENTER));

        let notes = db.notifications().list_for_user(OWNER).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::BookingRequest);
        assert!(notes[0].message.contains("has requested to book"));
        assert_eq!(notes[0].booking_id.as_deref(), Some(booking.id.as_str()));
        assert!(!notes[0].is_read);

        assert_consistent(&db, &listing.id).await;
    }

    #[tokio::test]
    async fn test_request_defaults_duration() {
        let db = database().await;
        let listing = db.listings().create(&identity(OWNER), &tent()).await.unwrap();

        let booking = db
            .lifecycle()
            .request(
                &identity(RENTER),
                &BookingRequest {
                    listing_id: listing.id.clone(),
                    duration: None,
                    duration_unit: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(booking.duration, DEFAULT_BOOKING_DURATION);
        assert_eq!(booking.duration_unit, DurationUnit::PerHour);
        // Hourly requests still take the daily rate when one is set
        assert_eq!(booking.price_cents, 2500);
    }

    #[tokio::test]
    async fn test_request_failures_leave_no_trace() {
        let db = database().await;
        let listing = db.listings().create(&identity(OWNER), &tent()).await.unwrap();
        let lifecycle = db.lifecycle();

        let err = lifecycle
            .request(&identity(OWNER), &request_for(&listing.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Forbidden(_))));

        let missing = uuid::Uuid::new_v4().to_string();
        let err = lifecycle
            .request(&identity(RENTER), &request_for(&missing))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));

        let err = lifecycle
            .request(
                &identity(RENTER),
                &BookingRequest {
                    duration: Some(0),
                    ..request_for(&listing.id)
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        let stored = db.listings().find_by_id(&listing.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ListingStatus::Active);
        assert!(db.bookings().find_by_listing(&listing.id).await.unwrap().is_empty());
        assert!(db.notifications().list_for_user(OWNER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_request_conflicts() {
        let db = database().await;
        let listing = db.listings().create(&identity(OWNER), &tent()).await.unwrap();
        let lifecycle = db.lifecycle();

        lifecycle
            .request(&identity(RENTER), &request_for(&listing.id))
            .await
            .unwrap();
        let err = lifecycle
            .request(&identity(OTHER), &request_for(&listing.id))
            .await
            .unwrap_err();

        match err {
            DbError::Domain(CoreError::Conflict(msg)) => assert_eq!(msg, ITEM_NOT_AVAILABLE),
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(db.bookings().find_by_listing(&listing.id).await.unwrap().len(), 1);
        assert_consistent(&db, &listing.id).await;
    }

    #[tokio::test]
    async fn test_concurrent_requests_exactly_one_wins() {
        let path = std::env::temp_dir().join(format!("renthub-race-{}.db", uuid::Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();
        register_users(&db).await;
        let listing = db.listings().create(&identity(OWNER), &tent()).await.unwrap();

        let a = db.lifecycle();
        let b = db.lifecycle();
        let (renter, other) = (identity(RENTER), identity(OTHER));
        let (req_a, req_b) = (request_for(&listing.id), request_for(&listing.id));

        let (first, second) = tokio::join!(a.request(&renter, &req_a), b.request(&other, &req_b));

        let outcomes = [first, second];
        let wins = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        for result in &outcomes {
            if let Err(err) = result {
                assert!(matches!(err, DbError::Domain(CoreError::Conflict(_))), "{err:?}");
            }
        }

        assert_eq!(db.bookings().find_by_listing(&listing.id).await.unwrap().len(), 1);
        assert_eq!(db.notifications().list_for_user(OWNER).await.unwrap().len(), 1);
        assert_consistent(&db, &listing.id).await;

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_confirm_scenario() {
        let db = database().await;
        let listing = db.listings().create(&identity(OWNER), &tent()).await.unwrap();
        let lifecycle = db.lifecycle();
        let booking = lifecycle
            .request(&identity(RENTER), &request_for(&listing.id))
            .await
            .unwrap();

        let confirmed = lifecycle.confirm(&identity(OWNER), &booking.id).await.unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);

        let stored = db.listings().find_by_id(&listing.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ListingStatus::Rented);
        assert_eq!(stored.holder_id.as_deref(), Some(RENTER));

        let renter_notes = db.notifications().list_for_user(RENTER).await.unwrap();
        assert_eq!(renter_notes.len(), 1);
        assert_eq!(renter_notes[0].kind, NotificationKind::BookingConfirmed);
        assert!(renter_notes[0].message.contains("has been confirmed"));

        // Request notification retired once decided
        assert!(db.notifications().list_for_user(OWNER).await.unwrap().is_empty());

        let booked = db.listings().booked_by(RENTER).await.unwrap();
        assert_eq!(booked.len(), 1);
        assert_eq!(booked[0].booking_status, BookingStatus::Confirmed);

        assert_consistent(&db, &listing.id).await;
    }

    #[tokio::test]
    async fn test_confirm_rules() {
        let db = database().await;
        let listing = db.listings().create(&identity(OWNER), &tent()).await.unwrap();
        let lifecycle = db.lifecycle();
        let booking = lifecycle
            .request(&identity(RENTER), &request_for(&listing.id))
            .await
            .unwrap();

        let err = lifecycle.confirm(&identity(OTHER), &booking.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Forbidden(_))));

        let err = lifecycle.confirm(&identity(OWNER), "missing").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));

        lifecycle.confirm(&identity(OWNER), &booking.id).await.unwrap();
        let err = lifecycle.confirm(&identity(OWNER), &booking.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidState { .. })));

        assert_consistent(&db, &listing.id).await;
    }

    #[tokio::test]
    async fn test_confirm_is_atomic_when_notification_fails() {
        let db = database().await;
        let listing = db.listings().create(&identity(OWNER), &tent()).await.unwrap();
        let lifecycle = db.lifecycle();
        let booking = lifecycle
            .request(&identity(RENTER), &request_for(&listing.id))
            .await
            .unwrap();

        sqlx::query(
            r#"
            CREATE TRIGGER fail_confirmation_notice
            BEFORE INSERT ON notifications
            WHEN NEW.kind = 'booking_confirmed'
            BEGIN
                SELECT RAISE(ABORT, 'notification store unavailable');
            END
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = lifecycle.confirm(&identity(OWNER), &booking.id).await.unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(_)), "{err:?}");

        let stored = db.listings().find_by_id(&listing.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ListingStatus::Pending);
        let stored_booking = db.bookings().find_by_id(&booking.id).await.unwrap().unwrap();
        assert_eq!(stored_booking.status, BookingStatus::Pending);
        assert!(db.notifications().list_for_user(RENTER).await.unwrap().is_empty());
        assert_eq!(
            db.notifications()
                .count_unread(OWNER, NotificationClass::Requests)
                .await
                .unwrap(),
            1
        );

        assert_consistent(&db, &listing.id).await;
    }

    #[tokio::test]
    async fn test_reject_frees_listing() {
        let db = database().await;
        let listing = db.listings().create(&identity(OWNER), &tent()).await.unwrap();
        let lifecycle = db.lifecycle();
        let booking = lifecycle
            .request(&identity(RENTER), &request_for(&listing.id))
            .await
            .unwrap();

        let rejected = lifecycle.reject(&identity(OWNER), &booking.id).await.unwrap();
        assert_eq!(rejected.status, BookingStatus::Rejected);

        let stored = db.listings().find_by_id(&listing.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ListingStatus::Active);
        assert!(stored.holder_id.is_none());
        assert_consistent(&db, &listing.id).await;

        let renter_notes = db.notifications().list_for_user(RENTER).await.unwrap();
        assert_eq!(renter_notes[0].kind, NotificationKind::BookingRejected);

        // Someone else may now request it
        lifecycle
            .request(&identity(OTHER), &request_for(&listing.id))
            .await
            .unwrap();
        assert_consistent(&db, &listing.id).await;
    }

    #[tokio::test]
    async fn test_return_scenario_and_idempotence() {
        let db = database().await;
        let listing = db.listings().create(&identity(OWNER), &tent()).await.unwrap();
        let lifecycle = db.lifecycle();
        let booking = lifecycle
            .request(&identity(RENTER), &request_for(&listing.id))
            .await
            .unwrap();
        lifecycle.confirm(&identity(OWNER), &booking.id).await.unwrap();

        let err = lifecycle.return_item(&identity(OTHER), &listing.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Forbidden(_))));

        let returned = lifecycle.return_item(&identity(RENTER), &listing.id).await.unwrap();
        assert_eq!(returned.status, ListingStatus::Returned);

        let stored_booking = db.bookings().find_by_id(&booking.id).await.unwrap().unwrap();
        assert_eq!(stored_booking.status, BookingStatus::Completed);

        let owner_notes = db.notifications().list_for_user(OWNER).await.unwrap();
        assert_eq!(owner_notes.len(), 1);
        assert_eq!(owner_notes[0].kind, NotificationKind::ItemReturned);
        assert!(owner_notes[0].message.contains("has been returned"));
        assert_eq!(owner_notes[0].booking_id.as_deref(), Some(booking.id.as_str()));
        assert_consistent(&db, &listing.id).await;

        let before = db.listings().find_by_id(&listing.id).await.unwrap().unwrap();
        let again = lifecycle.return_item(&identity(RENTER), &listing.id).await.unwrap();
        assert_eq!(again.status, ListingStatus::Returned);
        let after = db.listings().find_by_id(&listing.id).await.unwrap().unwrap();
        assert_eq!(before, after);
        assert_eq!(db.notifications().list_for_user(OWNER).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_return_without_confirmed_booking() {
        let db = database().await;
        let listing = db.listings().create(&identity(OWNER), &tent()).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        ListingRepository::set_status(&mut conn, &listing.id, ListingStatus::Rented, Some(RENTER))
            .await
            .unwrap();
        drop(conn);

        let returned = db
            .lifecycle()
            .return_item(&identity(RENTER), &listing.id)
            .await
            .unwrap();
        assert_eq!(returned.status, ListingStatus::Returned);
        assert_eq!(returned.holder_id.as_deref(), Some(RENTER));
        assert!(db.bookings().find_by_listing(&listing.id).await.unwrap().is_empty());

        let owner_notes = db.notifications().list_for_user(OWNER).await.unwrap();
        assert_eq!(owner_notes.len(), 1);
        assert_eq!(owner_notes[0].kind, NotificationKind::ItemReturned);
        assert!(owner_notes[0].booking_id.is_none());
        assert_eq!(owner_notes[0].renter_id.as_deref(), Some(RENTER));
    }

    #[tokio::test]
    async fn test_cycle_with_unregistered_identities() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (owner, renter) = (identity(OWNER), identity(RENTER));
        let lifecycle = db.lifecycle();

        let listing = db.listings().create(&owner, &tent()).await.unwrap();
        let booking = lifecycle.request(&renter, &request_for(&listing.id)).await.unwrap();
        lifecycle.confirm(&owner, &booking.id).await.unwrap();
        lifecycle.return_item(&renter, &listing.id).await.unwrap();
        lifecycle.relist(&owner, &listing.id).await.unwrap();

        assert!(db.users().get_by_id(RENTER).await.unwrap().is_some());
        assert_eq!(db.notifications().list_for_user(RENTER).await.unwrap().len(), 1);
        assert_eq!(db.notifications().list_for_user(OWNER).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_messages_use_stored_name() {
        let db = database().await;
        let listing = db.listings().create(&identity(OWNER), &tent()).await.unwrap();
        let lifecycle = db.lifecycle();

        let stale = identity(RENTER);
        db.users()
            .update_profile(
                &stale,
                &ProfileUpdate {
                    fullname: "Rafi R. Renter".to_string(),
                    phone: stale.phone.clone(),
                    city: stale.city.clone(),
                },
            )
            .await
            .unwrap();

        let booking = lifecycle.request(&stale, &request_for(&listing.id)).await.unwrap();
        let notes = db.notifications().list_for_user(OWNER).await.unwrap();
        assert!(notes[0].message.contains("Renter Rafi R. Renter has requested"));

        lifecycle.confirm(&identity(OWNER), &booking.id).await.unwrap();
        lifecycle.return_item(&stale, &listing.id).await.unwrap();
        let notes = db.notifications().list_for_user(OWNER).await.unwrap();
        assert!(notes[0].message.ends_with("returned by Rafi R. Renter."));
    }

    #[tokio::test]
    async fn test_return_requires_rented_listing() {
        let db = database().await;
        let listing = db.listings().create(&identity(OWNER), &tent()).await.unwrap();
        let lifecycle = db.lifecycle();
        lifecycle
            .request(&identity(RENTER), &request_for(&listing.id))
            .await
            .unwrap();

        let err = lifecycle.return_item(&identity(RENTER), &listing.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidState { .. })));

        let err = lifecycle.return_item(&identity(RENTER), "missing").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));

        assert_consistent(&db, &listing.id).await;
    }

    #[tokio::test]
    async fn test_relist_after_return() {
        let db = database().await;
        let listing = db.listings().create(&identity(OWNER), &tent()).await.unwrap();
        let lifecycle = db.lifecycle();

        let err = lifecycle.relist(&identity(OWNER), &listing.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidState { .. })));

        let booking = lifecycle
            .request(&identity(RENTER), &request_for(&listing.id))
            .await
            .unwrap();
        lifecycle.confirm(&identity(OWNER), &booking.id).await.unwrap();
        lifecycle.return_item(&identity(RENTER), &listing.id).await.unwrap();

        let err = lifecycle.relist(&identity(RENTER), &listing.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Forbidden(_))));

        let relisted = lifecycle.relist(&identity(OWNER), &listing.id).await.unwrap();
        assert_eq!(relisted.status, ListingStatus::Active);
        assert!(relisted.holder_id.is_none());
        assert_consistent(&db, &listing.id).await;

        let history = db.listings().history_for_owner(OWNER).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].booking_status, Some(BookingStatus::Completed));
    }
}
