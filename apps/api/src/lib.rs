//! # RentHub Command Layer
//!
//! The operations the HTTP collaborator exposes, one async function each.
//!
//! ## Module Organization
//! ```text
//! renthub_api/
//! ├── lib.rs          ◄─── You are here (logging bootstrap)
//! ├── config.rs       ◄─── Environment configuration
//! ├── state.rs        ◄─── Shared AppState (database + config)
//! ├── commands/
//! │   ├── mod.rs          ◄─── Command exports
//! │   ├── listing.rs      ◄─── Submit, browse, history, booked items
//! │   ├── booking.rs      ◄─── Request, confirm, reject, return, relist
//! │   ├── notification.rs ◄─── Inbox, unread counters, mark read
//! │   └── profile.rs      ◄─── Profile edits
//! └── error.rs        ◄─── ApiError + ApiResponse envelope
//! ```
//!
//! ## Calling Convention
//! ```rust,ignore
//! let state = AppState::open(AppConfig::from_env()?).await?;
//!
//! // The HTTP collaborator authenticates the session and builds the identity.
//! let caller: CallerIdentity = session.identity();
//!
//! let result = commands::booking::request_booking(&state, &caller, request).await;
//! let body = ApiResponse::from_result(result, "Booking request sent");
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use tracing_subscriber::EnvFilter;

pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ApiResponse, ErrorCode};
pub use state::AppState;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=renthub=trace` - Show trace for renthub crates only
/// - Default: `info,renthub=debug,sqlx=warn`
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,renthub=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
