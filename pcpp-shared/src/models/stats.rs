/// Site-wide counters shown on the landing page

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Stats {
    pub users: i64,
    pub notes: i64,
    pub comments: i64,
}

impl Stats {
    /// Counts users, notes and comments in a single statement
    pub async fn collect(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let stats = sqlx::query_as::<_, Stats>(
            r#"
            SELECT (SELECT COUNT(*) FROM users) AS users,
                   (SELECT COUNT(*) FROM notes) AS notes,
                   (SELECT COUNT(*) FROM comments) AS comments
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(stats)
    }
}
