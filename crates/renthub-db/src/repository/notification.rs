//! # Notification Repository
//!
//! The notification dispatcher: per-user messages produced by lifecycle
//! transitions, plus the badge counters and read flags the frontend shows.
//!
//! Counters and retirement filter on [`NotificationKind`], never on the
//! message text.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::user::UserRepository;
use renthub_core::{CoreError, NewNotification, Notification, NotificationClass, NotificationKind};

/// Repository for notification database operations.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    /// Records an unread notification for `input.user_id`.
    ///
    /// `NotFound` if the recipient has no profile.
    pub async fn notify(conn: &mut SqliteConnection, input: &NewNotification) -> DbResult<Notification> {
        if !UserRepository::exists(conn, &input.user_id).await? {
            return Err(CoreError::not_found("User", &input.user_id).into());
        }

        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            user_id: input.user_id.clone(),
            kind: input.kind,
            message: input.message.clone(),
            booking_id: input.booking_id.clone(),
            renter_id: input.renter_id.clone(),
            is_read: false,
            created_at: Utc::now(),
        };

        debug!(id = %notification.id, user_id = %notification.user_id, kind = ?notification.kind, "Inserting notification");

        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, user_id, kind, message, booking_id, renter_id, is_read, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)
            "#,
        )
        .bind(&notification.id)
        .bind(&notification.user_id)
        .bind(notification.kind)
        .bind(&notification.message)
        .bind(&notification.booking_id)
        .bind(&notification.renter_id)
        .bind(notification.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(notification)
    }

    /// Deletes the owner's request notification for a booking once decided.
    ///
    /// Returns rows deleted; zero when the owner had already dismissed it.
    pub async fn retire_request_notification(
        conn: &mut SqliteConnection,
        owner_id: &str,
        booking_id: &str,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE user_id = ?1 AND booking_id = ?2 AND kind = ?3
            "#,
        )
        .bind(owner_id)
        .bind(booking_id)
        .bind(NotificationKind::BookingRequest)
        .execute(&mut *conn)
        .await?;

        debug!(owner_id = %owner_id, booking_id = %booking_id, deleted = result.rows_affected(), "Retired request notification");
        Ok(result.rows_affected())
    }

    /// Marks a notification read. Idempotent.
    ///
    /// `NotFound` if absent, `Forbidden` if `caller_id` is not the recipient.
    pub async fn mark_read(&self, id: &str, caller_id: &str) -> DbResult<()> {
        let recipient: Option<String> =
            sqlx::query_scalar("SELECT user_id FROM notifications WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match recipient {
            None => return Err(CoreError::not_found("Notification", id).into()),
            Some(user_id) if user_id != caller_id => {
                return Err(CoreError::forbidden("Notification is addressed to another user").into())
            }
            Some(_) => {}
        }

        debug!(id = %id, "Marking notification read");

        sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Unread notifications of `class` addressed to `user_id`.
    pub async fn count_unread(&self, user_id: &str, class: NotificationClass) -> DbResult<i64> {
        let per_kind: Vec<(NotificationKind, i64)> = sqlx::query_as(
            r#"
            SELECT kind, COUNT(*)
            FROM notifications
            WHERE user_id = ?1 AND is_read = 0
            GROUP BY kind
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(per_kind
            .into_iter()
            .filter(|(kind, _)| class.matches(*kind))
            .map(|(_, count)| count)
            .sum())
    }

    /// All notifications addressed to `user_id`, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, kind, message, booking_id, renter_id, is_read, created_at
            FROM notifications
            WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::test_support::{database, OTHER, OWNER};

    fn note(user_id: &str, kind: NotificationKind) -> NewNotification {
        NewNotification {
            user_id: user_id.to_string(),
            kind,
            message: format!("{:?}", kind),
            booking_id: None,
            renter_id: None,
        }
    }

    #[tokio::test]
    async fn test_notify_requires_recipient() {
        let db = database().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let err = NotificationRepository::notify(&mut conn, &note("ghost", NotificationKind::Message))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_counters_by_kind() {
        let db = database().await;
        let mut conn = db.pool().acquire().await.unwrap();

        for kind in [
            NotificationKind::BookingRequest,
            NotificationKind::BookingRequest,
            NotificationKind::BookingConfirmed,
            NotificationKind::ItemReturned,
            NotificationKind::Message,
        ] {
            NotificationRepository::notify(&mut conn, &note(OWNER, kind)).await.unwrap();
        }
        drop(conn);

        let repo = db.notifications();
        assert_eq!(repo.count_unread(OWNER, NotificationClass::Requests).await.unwrap(), 2);
        assert_eq!(repo.count_unread(OWNER, NotificationClass::Messages).await.unwrap(), 2);
        assert_eq!(repo.count_unread(OTHER, NotificationClass::Requests).await.unwrap(), 0);
        assert_eq!(repo.list_for_user(OWNER).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_mark_read_rules() {
        let db = database().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let n = NotificationRepository::notify(&mut conn, &note(OWNER, NotificationKind::Message))
            .await
            .unwrap();
        drop(conn);

        let repo = db.notifications();

        let err = repo.mark_read(&n.id, OTHER).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Forbidden(_))));

        let err = repo.mark_read("missing", OWNER).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));

        repo.mark_read(&n.id, OWNER).await.unwrap();
        repo.mark_read(&n.id, OWNER).await.unwrap();

        assert_eq!(repo.count_unread(OWNER, NotificationClass::Messages).await.unwrap(), 0);
        assert!(repo.list_for_user(OWNER).await.unwrap()[0].is_read);
    }
}
