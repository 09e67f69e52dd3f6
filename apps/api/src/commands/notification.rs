//! # Notification Commands
//!
//! The caller's inbox and the two badge counters.

use crate::commands::checked;
use crate::error::ApiError;
use crate::state::AppState;
use renthub_core::validation::validate_id;
use renthub_core::{CallerIdentity, Notification, NotificationClass};

/// All notifications addressed to the caller, newest first.
pub async fn list_notifications(
    state: &AppState,
    caller: &CallerIdentity,
) -> Result<Vec<Notification>, ApiError> {
    Ok(state.db.notifications().list_for_user(&caller.user_id).await?)
}

/// Unread booking requests awaiting the caller's decision.
pub async fn unread_request_count(
    state: &AppState,
    caller: &CallerIdentity,
) -> Result<i64, ApiError> {
    Ok(state
        .db
        .notifications()
        .count_unread(&caller.user_id, NotificationClass::Requests)
        .await?)
}

/// Unread informational notifications (returns, rejections, messages).
pub async fn unread_message_count(
    state: &AppState,
    caller: &CallerIdentity,
) -> Result<i64, ApiError> {
    Ok(state
        .db
        .notifications()
        .count_unread(&caller.user_id, NotificationClass::Messages)
        .await?)
}

/// Marks one of the caller's notifications read.
pub async fn mark_notification_read(
    state: &AppState,
    caller: &CallerIdentity,
    notification_id: &str,
) -> Result<(), ApiError> {
    validate_id("notification_id", notification_id)?;

    let result = state
        .db
        .notifications()
        .mark_read(notification_id, &caller.user_id)
        .await;
    checked("mark_notification_read", &caller.user_id, notification_id, result)
}
