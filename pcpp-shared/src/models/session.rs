/// Server-side sessions
///
/// The cookie carries an opaque token; the table stores its SHA-256 hash (see
/// [`crate::auth::token`]). A session is live while `expires_at` (unix seconds)
/// is in the future.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     token_hash TEXT NOT NULL UNIQUE,
///     user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     created_at TEXT NOT NULL,
///     expires_at INTEGER NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use pcpp_shared::models::session::Session;
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
/// let (token, _session) = Session::create(&pool, user_id, Duration::hours(24)).await?;
///
/// // Later, from the cookie value
/// let user = Session::find_user(&pool, &token).await?;
/// assert!(user.is_some());
///
/// Session::delete_by_token(&pool, &token).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::auth::token::{generate_session_token, hash_session_token, is_valid_token_format};
use crate::models::user::User;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    pub token_hash: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    /// Unix timestamp (seconds)
    pub expires_at: i64,
}

impl Session {
    /// Opens a session for `user_id` and returns the plaintext token with the row
    ///
    /// Expired sessions are purged first.
    pub async fn create(
        pool: &SqlitePool,
        user_id: i64,
        ttl: Duration,
    ) -> Result<(String, Self), sqlx::Error> {
        let purged = Self::purge_expired(pool).await?;
        if purged > 0 {
            debug!(purged, "Purged expired sessions");
        }

        let (token, token_hash) = generate_session_token();
        let expires_at = (Utc::now() + ttl).timestamp();

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token_hash, user_id, expires_at)
            VALUES (?, ?, ?)
            RETURNING id, token_hash, user_id, created_at, expires_at
            "#,
        )
        .bind(token_hash)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok((token, session))
    }

    /// Resolves a cookie token to its user, if the session is still live
    pub async fn find_user(pool: &SqlitePool, token: &str) -> Result<Option<User>, sqlx::Error> {
        if !is_valid_token_format(token) {
            return Ok(None);
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.name, u.email, u.password_hash, u.level, u.created_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = ? AND s.expires_at > ?
            "#,
        )
        .bind(hash_session_token(token))
        .bind(Utc::now().timestamp())
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Ends the session for this token. Returns false if there was none.
    pub async fn delete_by_token(pool: &SqlitePool, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(hash_session_token(token))
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every session past its expiry, returning how many were removed
    pub async fn purge_expired(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now().timestamp())
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
