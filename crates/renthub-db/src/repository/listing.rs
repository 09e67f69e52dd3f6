//! # Listing Repository
//!
//! The listing store: persistence and queries for items offered for rent.
//!
//! ## Status Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Who writes what                                  │
//! │                                                                         │
//! │  ListingRepository::create     → status = active (only entry point)   │
//! │  ListingRepository::transition → conditional status change            │
//! │  ListingRepository::set_status → unconditional status change          │
//! │                                                                         │
//! │  transition / set_status take a connection, never the pool: they are   │
//! │  only called by BookingLifecycle inside its transaction.               │
//! │                                                                         │
//! │  Listings are never deleted.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::user::UserRepository;
use renthub_core::validation::validate_new_listing;
use renthub_core::{
    BookedItem, BookingStatus, CallerIdentity, CoreError, DurationUnit, Listing,
    ListingHistoryEntry, ListingStatus, NewListing, MAX_LISTING_IMAGES,
};

/// Column list shared by every listing query (table aliased as `l`).
macro_rules! listing_columns {
    () => {
        r#"
            l.id, l.owner_id, l.owner_name, l.owner_contact, l.owner_email, l.location,
            l.title, l.category, l.description,
            l.price_per_hour_cents, l.price_per_day_cents, l.deposit_cents,
            l.available_from, l.available_until, l.conditions,
            l.status, l.holder_id, l.images, l.created_at, l.updated_at
        "#
    };
}

// =============================================================================
// Row Types
// =============================================================================

/// Raw `listings` row; `images` is still JSON text.
#[derive(Debug, FromRow)]
pub(crate) struct ListingRow {
    id: String,
    owner_id: String,
    owner_name: String,
    owner_contact: String,
    owner_email: Option<String>,
    location: String,
    title: String,
    category: String,
    description: String,
    price_per_hour_cents: Option<i64>,
    price_per_day_cents: Option<i64>,
    deposit_cents: Option<i64>,
    available_from: Option<chrono::NaiveDate>,
    available_until: Option<chrono::NaiveDate>,
    conditions: String,
    status: ListingStatus,
    holder_id: Option<String>,
    images: String,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl TryFrom<ListingRow> for Listing {
    type Error = DbError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let images: Vec<String> = serde_json::from_str(&row.images)?;

        Ok(Listing {
            id: row.id,
            owner_id: row.owner_id,
            owner_name: row.owner_name,
            owner_contact: row.owner_contact,
            owner_email: row.owner_email,
            location: row.location,
            title: row.title,
            category: row.category,
            description: row.description,
            price_per_hour_cents: row.price_per_hour_cents,
            price_per_day_cents: row.price_per_day_cents,
            deposit_cents: row.deposit_cents,
            available_from: row.available_from,
            available_until: row.available_until,
            conditions: row.conditions,
            status: row.status,
            holder_id: row.holder_id,
            images,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ListingHistoryRow {
    #[sqlx(flatten)]
    listing: ListingRow,
    booking_id: Option<String>,
    booking_price_cents: Option<i64>,
    booking_duration: Option<i64>,
    booking_duration_unit: Option<DurationUnit>,
    booking_status: Option<BookingStatus>,
}

#[derive(Debug, FromRow)]
struct BookedItemRow {
    #[sqlx(flatten)]
    listing: ListingRow,
    booking_id: String,
    booking_price_cents: i64,
    booking_duration: i64,
    booking_duration_unit: DurationUnit,
    booking_status: BookingStatus,
}

fn into_listings(rows: Vec<ListingRow>) -> DbResult<Vec<Listing>> {
    rows.into_iter().map(Listing::try_from).collect()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for listing database operations.
#[derive(Debug, Clone)]
pub struct ListingRepository {
    pool: SqlitePool,
}

impl ListingRepository {
    /// Creates a new ListingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ListingRepository { pool }
    }

    /// Persists a new listing with status `Active`.
    ///
    /// ## Snapshot Pattern
    /// Owner name, contact, email and city are copied from the caller so the
    /// listing keeps showing who posted it even if the profile changes later.
    /// The owner's profile is mirrored in the same transaction.
    pub async fn create(&self, owner: &CallerIdentity, input: &NewListing) -> DbResult<Listing> {
        validate_new_listing(input, MAX_LISTING_IMAGES).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;
        UserRepository::ensure_profile(&mut tx, owner).await?;

        let now = Utc::now();
        let listing = Listing {
            id: Uuid::new_v4().to_string(),
            owner_id: owner.user_id.clone(),
            owner_name: owner.fullname.clone(),
            owner_contact: owner.phone.clone(),
            owner_email: owner.email.clone(),
            location: owner.city.clone(),
            title: input.title.trim().to_string(),
            category: input.category.trim().to_string(),
            description: input.description.trim().to_string(),
            price_per_hour_cents: input.price_per_hour_cents,
            price_per_day_cents: input.price_per_day_cents,
            deposit_cents: input.deposit_cents,
            available_from: input.available_from,
            available_until: input.available_until,
            conditions: input.conditions.clone().unwrap_or_default(),
            status: ListingStatus::Active,
            holder_id: None,
            images: input.images.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %listing.id, owner_id = %listing.owner_id, "Inserting listing");

        sqlx::query(
            r#"
            INSERT INTO listings (
                id, owner_id, owner_name, owner_contact, owner_email, location,
                title, category, description,
                price_per_hour_cents, price_per_day_cents, deposit_cents,
                available_from, available_until, conditions,
                status, holder_id, images, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9,
                ?10, ?11, ?12,
                ?13, ?14, ?15,
                ?16, ?17, ?18, ?19, ?20
            )
            "#,
        )
        .bind(&listing.id)
        .bind(&listing.owner_id)
        .bind(&listing.owner_name)
        .bind(&listing.owner_contact)
        .bind(&listing.owner_email)
        .bind(&listing.location)
        .bind(&listing.title)
        .bind(&listing.category)
        .bind(&listing.description)
        .bind(listing.price_per_hour_cents)
        .bind(listing.price_per_day_cents)
        .bind(listing.deposit_cents)
        .bind(listing.available_from)
        .bind(listing.available_until)
        .bind(&listing.conditions)
        .bind(listing.status)
        .bind(&listing.holder_id)
        .bind(serde_json::to_string(&listing.images)?)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(DbError::transaction)?;

        Ok(listing)
    }

    /// All `Active` listings not owned by `excluding_owner`, newest first.
    pub async fn find_available(&self, excluding_owner: &str) -> DbResult<Vec<Listing>> {
        let rows = sqlx::query_as::<_, ListingRow>(concat!(
            "SELECT ",
            listing_columns!(),
            r#"
            FROM listings l
            WHERE l.status = 'active' AND l.owner_id <> ?1
            ORDER BY l.created_at DESC, l.rowid DESC
            "#
        ))
        .bind(excluding_owner)
        .fetch_all(&self.pool)
        .await?;

        into_listings(rows)
    }

    /// Gets a listing by ID.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Listing>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_id_in(&mut conn, id).await
    }

    /// Gets a listing by ID on the caller's connection or transaction.
    pub async fn find_by_id_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Listing>> {
        let row = sqlx::query_as::<_, ListingRow>(concat!(
            "SELECT ",
            listing_columns!(),
            "FROM listings l WHERE l.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(Listing::try_from).transpose()
    }

    /// Refreshes `updated_at`, taking the database write lock.
    ///
    /// Lifecycle transactions call this (or [`Self::transition`]) as their
    /// first statement so that competing writers queue on the busy timeout
    /// instead of failing on a stale read snapshot. Returns rows touched.
    pub async fn touch(conn: &mut SqliteConnection, id: &str) -> DbResult<u64> {
        let result = sqlx::query("UPDATE listings SET updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Conditionally moves a listing from `from` to `to`.
    ///
    /// Returns the number of rows changed: 0 means the listing is absent, is
    /// no longer in `from`, or `holder` is its owner. A listing is never
    /// handed to its own owner.
    pub async fn transition(
        conn: &mut SqliteConnection,
        id: &str,
        from: ListingStatus,
        to: ListingStatus,
        holder: Option<&str>,
    ) -> DbResult<u64> {
        debug!(id = %id, %from, %to, "Transitioning listing");

        let result = sqlx::query(
            r#"
            UPDATE listings SET
                status = ?3,
                holder_id = ?4,
                updated_at = ?5
            WHERE id = ?1
              AND status = ?2
              AND (?4 IS NULL OR owner_id <> ?4)
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(holder)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Unconditionally sets a listing's status and holder.
    ///
    /// No cross-entity checks: the lifecycle manager has already made them.
    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: &str,
        status: ListingStatus,
        holder: Option<&str>,
    ) -> DbResult<()> {
        debug!(id = %id, %status, "Setting listing status");

        let result = sqlx::query(
            r#"
            UPDATE listings SET
                status = ?2,
                holder_id = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(holder)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Listing", id).into());
        }

        Ok(())
    }

    /// The owner's listings left-joined with their bookings.
    ///
    /// A listing without bookings yields one entry with empty booking
    /// fields; a listing with several bookings yields one entry per booking.
    pub async fn history_for_owner(&self, owner_id: &str) -> DbResult<Vec<ListingHistoryEntry>> {
        let rows = sqlx::query_as::<_, ListingHistoryRow>(concat!(
            "SELECT ",
            listing_columns!(),
            r#",
                b.id AS booking_id,
                b.price_cents AS booking_price_cents,
                b.duration AS booking_duration,
                b.duration_unit AS booking_duration_unit,
                b.status AS booking_status
            FROM listings l
            LEFT JOIN bookings b ON b.listing_id = l.id
            WHERE l.owner_id = ?1
            ORDER BY l.created_at DESC, l.rowid DESC, b.created_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(ListingHistoryEntry {
                    listing: Listing::try_from(row.listing)?,
                    booking_id: row.booking_id,
                    booking_price_cents: row.booking_price_cents,
                    booking_duration: row.booking_duration,
                    booking_duration_unit: row.booking_duration_unit,
                    booking_status: row.booking_status,
                })
            })
            .collect()
    }

    /// Listings the renter booked with a confirmed or completed booking.
    pub async fn booked_by(&self, renter_id: &str) -> DbResult<Vec<BookedItem>> {
        let rows = sqlx::query_as::<_, BookedItemRow>(concat!(
            "SELECT ",
            listing_columns!(),
            r#",
                b.id AS booking_id,
                b.price_cents AS booking_price_cents,
                b.duration AS booking_duration,
                b.duration_unit AS booking_duration_unit,
                b.status AS booking_status
            FROM listings l
            INNER JOIN bookings b ON b.listing_id = l.id
            WHERE b.renter_id = ?1
              AND b.status IN ('confirmed', 'completed')
            ORDER BY b.created_at DESC, b.rowid DESC
            "#
        ))
        .bind(renter_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(BookedItem {
                    listing: Listing::try_from(row.listing)?,
                    booking_id: row.booking_id,
                    booking_price_cents: row.booking_price_cents,
                    booking_duration: row.booking_duration,
                    booking_duration_unit: row.booking_duration_unit,
                    booking_status: row.booking_status,
                })
            })
            .collect()
    }

    /// Number of listings the user has posted.
    pub async fn count_by_owner(&self, owner_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings WHERE owner_id = ?1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
