//! # renthub-core: Pure Domain Logic for RentHub
//!
//! This crate holds the rules of the rental marketplace as pure functions
//! and plain types, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RentHub Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        HTTP / session layer (external collaborator)             │   │
//! │  │    verifies the caller, stores uploaded images                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CallerIdentity + request               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    renthub-api (commands)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ renthub-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ lifecycle │  │   money   │  │ validation│  │   │
//! │  │   │  Listing  │  │  rules +  │  │   Money   │  │   rules   │  │   │
//! │  │   │  Booking  │  │  messages │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 renthub-db (Database Layer)                     │   │
//! │  │        SQLite repositories, booking lifecycle transactions      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Listing, Booking, Notification, identity)
//! - [`lifecycle`] - Transition preconditions and notification wording
//! - [`money`] - Integer-cent money type
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use renthub_core::lifecycle::request_message;
//! use renthub_core::DurationUnit;
//!
//! let text = request_message("Rafi", "Camping Tent", 2, DurationUnit::PerDay);
//! assert!(text.contains("has requested to book"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum image references per listing (the upload form accepts five files).
pub const MAX_LISTING_IMAGES: usize = 5;

/// Duration used when a booking request leaves it out.
pub const DEFAULT_BOOKING_DURATION: i64 = 1;

/// Upper bound on a single booking's duration, in units.
///
/// Keeps `price × duration` far away from overflow and catches typos
/// such as 1000 days instead of 10.
pub const MAX_BOOKING_DURATION: i64 = 1_000;

/// Maximum length for titles, categories, names and cities.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum length for listing descriptions.
pub const MAX_DESCRIPTION_LEN: usize = 5_000;
