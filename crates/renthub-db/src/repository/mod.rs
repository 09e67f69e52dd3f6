//! # Repository Module
//!
//! Database repository implementations for RentHub.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Command (renthub-api)                                                 │
//! │       │                                                                 │
//! │       │  db.listings().find_available(&caller.user_id)                 │
//! │       ▼                                                                 │
//! │  ListingRepository                                                     │
//! │  ├── &self methods            → read paths, use the pool               │
//! │  └── fn(conn: &mut SqliteConnection, ..)                               │
//! │                               → lifecycle steps, run on the caller's   │
//! │                                 transaction (see crate::lifecycle)     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ListingRepository`](listing::ListingRepository) - Listing store
//! - [`BookingRepository`](booking::BookingRepository) - Booking ledger
//! - [`NotificationRepository`](notification::NotificationRepository) - Notification dispatcher
//! - [`UserRepository`](user::UserRepository) - Profile mirror

pub mod booking;
pub mod listing;
pub mod notification;
pub mod user;
