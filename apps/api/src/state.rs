//! # Application State
//!
//! Everything a command function needs, built once at startup and shared.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────┐      ┌──────────────────────────┐        │
//! │  │        Database          │      │        AppConfig         │        │
//! │  │                          │      │                          │        │
//! │  │  SqlitePool (cloneable)  │      │  upload_prefix           │        │
//! │  │  repositories on demand  │      │  max_images              │        │
//! │  │  lifecycle manager       │      │  db path / pool size     │        │
//! │  └──────────────────────────┘      └──────────────────────────┘        │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Database: the pool is internally synchronized                       │
//! │  • AppConfig: read-only after initialization                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no session or per-user state here: the caller's identity is an
//! explicit argument of every command.

use tracing::info;

use crate::config::AppConfig;
use renthub_db::{Database, DbResult};

/// Shared state handed to every command function.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        AppState { db, config }
    }

    /// Connects to the configured database and applies pending migrations.
    pub async fn open(config: AppConfig) -> DbResult<Self> {
        let db = Database::new(config.db_config()).await?;
        info!(path = %config.db_path.display(), "Application state initialized");
        Ok(AppState::new(db, config))
    }
}
