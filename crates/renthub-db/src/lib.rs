//! # renthub-db: Database Layer for RentHub
//!
//! This crate provides persistence for the rental marketplace and runs the
//! booking lifecycle transactions. It uses SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RentHub Data Flow                                │
//! │                                                                         │
//! │  renthub-api command (request_booking)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   renthub-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  listing      │    │  (embedded)  │  │   │
//! │  │   │               │    │  booking      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  notification │    │ 001_initial  │  │   │
//! │  │   │               │    │  user         │    │ 002_indexes  │  │   │
//! │  │   └───────▲───────┘    └───────▲───────┘    └──────────────┘  │   │
//! │  │           │                    │                               │   │
//! │  │   ┌───────┴────────────────────┴───────┐                       │   │
//! │  │   │  BookingLifecycle (lifecycle.rs)   │                       │   │
//! │  │   │  request / confirm / reject /      │                       │   │
//! │  │   │  return / relist, one txn each     │                       │   │
//! │  │   └────────────────────────────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Listing store, booking ledger, notifications, users
//! - [`lifecycle`] - Booking lifecycle manager
//!
//! ## Usage
//!
//! ```rust,ignore
//! use renthub_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/renthub.db")).await?;
//!
//! let available = db.listings().find_available(&caller.user_id).await?;
//! let booking = db.lifecycle().request(&caller, &request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use lifecycle::BookingLifecycle;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::booking::{BookingRepository, BookingWithListing};
pub use repository::listing::ListingRepository;
pub use repository::notification::NotificationRepository;
pub use repository::user::UserRepository;
