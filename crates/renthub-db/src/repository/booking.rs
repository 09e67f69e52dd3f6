//! # Booking Repository
//!
//! The booking ledger: one row per booking request, whatever became of it.
//!
//! ## Booking Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Booking Lifecycle                                 │
//! │                                                                         │
//! │  1. REQUEST                                                            │
//! │     └── create_request() → Booking { status: Pending }                 │
//! │         (refused while the listing has another open booking)           │
//! │                                                                         │
//! │  2a. CONFIRM                        2b. REJECT                         │
//! │     └── confirm() → Confirmed           └── reject() → Rejected        │
//! │                                                                         │
//! │  3. RETURN                                                             │
//! │     └── complete() → Completed  (0 rows is fine)                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation takes a `&mut SqliteConnection` so it runs inside the
//! lifecycle manager's transaction.

use chrono::Utc;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use renthub_core::lifecycle::ITEM_NOT_AVAILABLE;
use renthub_core::{Booking, BookingDetail, BookingStatus, CoreError, NewBooking};

macro_rules! booking_columns {
    () => {
        r#"
            b.id, b.listing_id, b.renter_id, b.owner_id,
            b.price_cents, b.duration, b.duration_unit, b.status,
            b.created_at, b.updated_at
        "#
    };
}

/// A booking together with the listing fields the lifecycle checks need.
#[derive(Debug, Clone, FromRow)]
pub struct BookingWithListing {
    #[sqlx(flatten)]
    pub booking: Booking,
    pub listing_owner_id: String,
    pub listing_title: String,
}

/// Repository for booking database operations.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookingRepository { pool }
    }

    // =========================================================================
    // Writes (transaction-scoped)
    // =========================================================================

    /// Records a new `Pending` booking.
    ///
    /// Fails with `Conflict` if the listing already has an open
    /// (`Pending` or `Confirmed`) booking.
    pub async fn create_request(conn: &mut SqliteConnection, input: &NewBooking) -> DbResult<Booking> {
        let open: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE listing_id = ?1 AND status IN ('pending', 'confirmed')
            "#,
        )
        .bind(&input.listing_id)
        .fetch_one(&mut *conn)
        .await?;

        if open > 0 {
            return Err(CoreError::conflict(ITEM_NOT_AVAILABLE).into());
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            listing_id: input.listing_id.clone(),
            renter_id: input.renter_id.clone(),
            owner_id: input.owner_id.clone(),
            price_cents: input.price_cents,
            duration: input.duration,
            duration_unit: input.duration_unit,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %booking.id, listing_id = %booking.listing_id, "Inserting booking");

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, listing_id, renter_id, owner_id,
                price_cents, duration, duration_unit, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&booking.id)
        .bind(&booking.listing_id)
        .bind(&booking.renter_id)
        .bind(&booking.owner_id)
        .bind(booking.price_cents)
        .bind(booking.duration)
        .bind(booking.duration_unit)
        .bind(booking.status)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(booking)
    }

    /// Refreshes `updated_at`, taking the database write lock.
    ///
    /// First statement of the confirm/reject transactions. Returns rows
    /// touched (0 when the booking does not exist).
    pub async fn touch(conn: &mut SqliteConnection, id: &str) -> DbResult<u64> {
        let result = sqlx::query("UPDATE bookings SET updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// `Pending → Confirmed`.
    pub async fn confirm(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        Self::settle_pending(conn, id, BookingStatus::Confirmed, "confirm").await
    }

    /// `Pending → Rejected`.
    pub async fn reject(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        Self::settle_pending(conn, id, BookingStatus::Rejected, "reject").await
    }

    async fn settle_pending(
        conn: &mut SqliteConnection,
        id: &str,
        to: BookingStatus,
        action: &str,
    ) -> DbResult<()> {
        debug!(id = %id, %to, "Settling pending booking");

        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = ?2,
                updated_at = ?3
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(to)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return match Self::find_by_id_in(conn, id).await? {
                None => Err(CoreError::not_found("Booking", id).into()),
                Some(booking) => {
                    Err(CoreError::invalid_state("Booking", id, booking.status, action).into())
                }
            };
        }

        Ok(())
    }

    /// `Confirmed → Completed` for the renter's booking of a listing.
    ///
    /// Returns the number of rows changed. Zero is not an error: the
    /// listing status already says the item came back.
    pub async fn complete(
        conn: &mut SqliteConnection,
        listing_id: &str,
        renter_id: &str,
    ) -> DbResult<u64> {
        debug!(listing_id = %listing_id, renter_id = %renter_id, "Completing booking");

        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = 'completed',
                updated_at = ?3
            WHERE listing_id = ?1 AND renter_id = ?2 AND status = 'confirmed'
            "#,
        )
        .bind(listing_id)
        .bind(renter_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a booking by ID.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Booking>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_id_in(&mut conn, id).await
    }

    /// Gets a booking by ID on the caller's connection or transaction.
    pub async fn find_by_id_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(concat!(
            "SELECT ",
            booking_columns!(),
            "FROM bookings b WHERE b.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(booking)
    }

    /// All bookings of a listing, newest first.
    pub async fn find_by_listing(&self, listing_id: &str) -> DbResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(concat!(
            "SELECT ",
            booking_columns!(),
            "FROM bookings b WHERE b.listing_id = ?1 ORDER BY b.created_at DESC, b.rowid DESC"
        ))
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// All bookings a renter has requested, newest first.
    pub async fn find_by_renter(&self, renter_id: &str) -> DbResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(concat!(
            "SELECT ",
            booking_columns!(),
            "FROM bookings b WHERE b.renter_id = ?1 ORDER BY b.created_at DESC, b.rowid DESC"
        ))
        .bind(renter_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// The renter's `Confirmed` booking of a listing, if any.
    pub async fn find_confirmed(
        conn: &mut SqliteConnection,
        listing_id: &str,
        renter_id: &str,
    ) -> DbResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(concat!(
            "SELECT ",
            booking_columns!(),
            r#"
            FROM bookings b
            WHERE b.listing_id = ?1 AND b.renter_id = ?2 AND b.status = 'confirmed'
            ORDER BY b.created_at DESC
            LIMIT 1
            "#
        ))
        .bind(listing_id)
        .bind(renter_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(booking)
    }

    /// Booking joined with its listing's owner and title.
    pub async fn find_with_listing(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<BookingWithListing>> {
        let row = sqlx::query_as::<_, BookingWithListing>(concat!(
            "SELECT ",
            booking_columns!(),
            r#",
                l.owner_id AS listing_owner_id,
                l.title AS listing_title
            FROM bookings b
            INNER JOIN listings l ON l.id = b.listing_id
            WHERE b.id = ?1
            "#
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row)
    }

    /// Booking joined with listing and renter profile, as the owner sees it.
    ///
    /// `NotFound` when the booking is absent or belongs to someone else's
    /// listing.
    pub async fn detail_for_owner(&self, booking_id: &str, owner_id: &str) -> DbResult<BookingDetail> {
        let detail = sqlx::query_as::<_, BookingDetail>(
            r#"
            SELECT
                b.id AS booking_id,
                b.listing_id,
                b.price_cents,
                b.duration,
                b.duration_unit,
                b.status,
                b.created_at,
                l.title AS item_title,
                l.description AS item_description,
                u.fullname AS renter_name,
                u.email AS renter_email,
                u.phone AS renter_phone
            FROM bookings b
            INNER JOIN listings l ON l.id = b.listing_id
            INNER JOIN users u ON u.id = b.renter_id
            WHERE b.id = ?1 AND l.owner_id = ?2
            "#,
        )
        .bind(booking_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        detail.ok_or_else(|| CoreError::not_found("Booking", booking_id).into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
