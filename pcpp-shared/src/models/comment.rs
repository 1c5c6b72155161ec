/// Comment model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     note_id INTEGER NOT NULL REFERENCES notes (id) ON DELETE CASCADE,
///     text TEXT NOT NULL,
///     author_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     author_name TEXT NOT NULL,
///     created_at TEXT NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Longest accepted comment, in characters
pub const MAX_COMMENT_LENGTH: usize = 5000;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub note_id: i64,
    pub text: String,
    pub author_id: i64,
    /// Current name of the author, joined from `users`
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a comment
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub note_id: i64,
    pub author_id: i64,
    pub text: String,
}

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.note_id, c.text, c.author_id, u.name AS author_name, c.created_at
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

impl Comment {
    /// Inserts a comment
    ///
    /// # Errors
    ///
    /// A missing note surfaces as a foreign key violation.
    pub async fn create(pool: &SqlitePool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO comments (note_id, text, author_id, author_name)
            VALUES (?, ?, ?, (SELECT name FROM users WHERE id = ?))
            RETURNING id
            "#,
        )
        .bind(data.note_id)
        .bind(data.text)
        .bind(data.author_id)
        .bind(data.author_id)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(&format!("{COMMENT_SELECT} WHERE c.id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(comment)
    }

    /// Lists the comments of a note, newest-first
    pub async fn list_by_note(pool: &SqlitePool, note_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "{COMMENT_SELECT} WHERE c.note_id = ? ORDER BY c.created_at DESC, c.id DESC"
        ))
        .bind(note_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Counts comments attached to one note
    pub async fn count_for_note(pool: &SqlitePool, note_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE note_id = ?")
            .bind(note_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts total number of comments
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
