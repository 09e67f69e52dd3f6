//! # User Repository
//!
//! Local mirror of the identity collaborator's user profiles.
//!
//! The core never authenticates anyone. A caller's profile is written the
//! first time any identity-bearing operation sees them, so listings,
//! bookings and notifications can always reference `users(id)`. After that
//! the stored row wins over the session snapshot and only changes through
//! [`UserRepository::update_profile`].

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use renthub_core::{CallerIdentity, CoreError, ProfileUpdate, UserProfile};

/// Repository for user profile operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a profile (used when the identity layer registers a user).
    pub async fn insert(&self, profile: &UserProfile) -> DbResult<()> {
        debug!(id = %profile.id, "Inserting user profile");

        sqlx::query(
            r#"
            INSERT INTO users (id, fullname, email, phone, city, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.fullname)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.city)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Registers a new profile with a generated timestamp.
    pub async fn register(
        &self,
        id: &str,
        fullname: &str,
        email: &str,
        phone: &str,
        city: &str,
    ) -> DbResult<UserProfile> {
        let profile = UserProfile {
            id: id.to_string(),
            fullname: fullname.to_string(),
            email: Some(email.to_string()),
            phone: phone.to_string(),
            city: city.to_string(),
            created_at: Utc::now(),
        };
        self.insert(&profile).await?;
        Ok(profile)
    }

    /// Gets a profile by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, fullname, email, phone, city, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Applies the caller's profile edit and returns the refreshed profile.
    ///
    /// A caller with no stored profile yet is mirrored first, so the edit
    /// never fails for an identity the collaborator already verified.
    pub async fn update_profile(
        &self,
        caller: &CallerIdentity,
        update: &ProfileUpdate,
    ) -> DbResult<UserProfile> {
        let id = caller.user_id.as_str();
        debug!(id = %id, "Updating user profile");

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        Self::ensure_profile(&mut tx, caller).await?;

        let result = sqlx::query(
            r#"
            UPDATE users SET
                fullname = ?2,
                phone = ?3,
                city = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.fullname.trim())
        .bind(update.phone.trim())
        .bind(update.city.trim())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("User", id).into());
        }

        let profile = Self::find_in(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))?;

        tx.commit().await.map_err(DbError::transaction)?;

        Ok(profile)
    }

    /// Mirrors `caller` on first sight and returns the stored profile.
    ///
    /// Runs on the caller's connection so it joins the surrounding
    /// transaction. An existing row is left untouched. A second user
    /// arriving with an email already on file is a `UniqueViolation`.
    pub async fn ensure_profile(
        conn: &mut SqliteConnection,
        caller: &CallerIdentity,
    ) -> DbResult<UserProfile> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO users (id, fullname, email, phone, city, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&caller.user_id)
        .bind(caller.fullname.trim())
        .bind(&caller.email)
        .bind(caller.phone.trim())
        .bind(caller.city.trim())
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if inserted > 0 {
            debug!(id = %caller.user_id, "Mirrored caller profile");
        }

        Self::find_in(conn, &caller.user_id)
            .await?
            .ok_or_else(|| DbError::not_found("User", &caller.user_id))
    }

    async fn find_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, fullname, email, phone, city, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(profile)
    }

    /// Checks that a profile exists, on the caller's connection.
    pub(crate) async fn exists(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?1")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::repository::user::UserRepository;
    use renthub_core::{CallerIdentity, ProfileUpdate};

    use crate::error::DbError;

    fn caller(id: &str, name: &str, email: Option<&str>) -> CallerIdentity {
        CallerIdentity {
            user_id: id.to_string(),
            fullname: name.to_string(),
            email: email.map(str::to_string),
            phone: "555-0100".to_string(),
            city: "Karachi".to_string(),
        }
    }

    fn edit(fullname: &str, city: &str) -> ProfileUpdate {
        ProfileUpdate {
            fullname: fullname.to_string(),
            phone: "555-0199".to_string(),
            city: city.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_update_profile() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        let profile = users
            .register("u-1", "Olive Owner", "olive@example.com", "555-0100", "Karachi")
            .await
            .unwrap();

        let updated = users
            .update_profile(&profile.to_identity(), &edit("Olive O. Owner", "Lahore"))
            .await
            .unwrap();

        assert_eq!(updated.fullname, "Olive O. Owner");
        assert_eq!(updated.city, "Lahore");
        assert_eq!(updated.email.as_deref(), Some("olive@example.com"));
    }

    #[tokio::test]
    async fn test_update_profile_mirrors_unknown_caller() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let updated = db
            .users()
            .update_profile(&caller("ghost", "Nobody", None), &edit("Somebody", "Quetta"))
            .await
            .unwrap();

        assert_eq!(updated.id, "ghost");
        assert_eq!(updated.fullname, "Somebody");
        assert!(updated.email.is_none());
        assert_eq!(db.users().get_by_id("ghost").await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_ensure_profile_keeps_stored_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let first = UserRepository::ensure_profile(&mut conn, &caller("u-1", "Olive", None))
            .await
            .unwrap();
        assert_eq!(first.fullname, "Olive");

        let again = UserRepository::ensure_profile(&mut conn, &caller("u-1", "Stale Name", None))
            .await
            .unwrap();
        assert_eq!(again, first);

        // Missing emails do not collide with each other
        UserRepository::ensure_profile(&mut conn, &caller("u-2", "Rafi", None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        users
            .register("u-1", "A", "same@example.com", "", "")
            .await
            .unwrap();
        let err = users
            .register("u-2", "B", "same@example.com", "", "")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let mut conn = db.pool().acquire().await.unwrap();
        let err = UserRepository::ensure_profile(&mut conn, &caller("u-3", "C", Some("same@example.com")))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
