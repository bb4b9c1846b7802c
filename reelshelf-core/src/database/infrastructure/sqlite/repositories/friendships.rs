use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::ports::FriendshipsRepository;
use crate::error::{CoreError, Result};
use crate::social::{FriendEntry, Friendship};

const FRIENDSHIP_COLUMNS: &str =
    "id, requester_id, addressee_id, status, created_at";

const ENTRY_COLUMNS: &str = "f.id AS relation_id, u.id, u.username, \
     u.avatar_url, u.created_at, f.created_at AS since";

#[derive(Clone, Debug)]
pub struct SqliteFriendshipsRepository {
    pool: SqlitePool,
}

impl SqliteFriendshipsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendshipsRepository for SqliteFriendshipsRepository {
    async fn get(&self, id: i64) -> Result<Option<Friendship>> {
        let row = sqlx::query_as::<_, Friendship>(&format!(
            "SELECT {FRIENDSHIP_COLUMNS} FROM friendships WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_between(&self, a: i64, b: i64) -> Result<Option<Friendship>> {
        let row = sqlx::query_as::<_, Friendship>(&format!(
            "SELECT {FRIENDSHIP_COLUMNS} FROM friendships \
             WHERE (requester_id = ? AND addressee_id = ?) \
                OR (requester_id = ? AND addressee_id = ?)"
        ))
        .bind(a)
        .bind(b)
        .bind(b)
        .bind(a)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_request(
        &self,
        requester_id: i64,
        addressee_id: i64,
    ) -> Result<Friendship> {
        sqlx::query_as::<_, Friendship>(&format!(
            "INSERT INTO friendships \
                 (requester_id, addressee_id, status, created_at) \
             VALUES (?, ?, 'pending', ?) \
             RETURNING {FRIENDSHIP_COLUMNS}"
        ))
        .bind(requester_id)
        .bind(addressee_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if CoreError::is_unique_violation(&e) {
                CoreError::Conflict("Friendship already exists".to_string())
            } else {
                CoreError::Database(e)
            }
        })
    }

    async fn accept(&self, id: i64) -> Result<Friendship> {
        sqlx::query_as::<_, Friendship>(&format!(
            "UPDATE friendships SET status = 'accepted' \
             WHERE id = ? RETURNING {FRIENDSHIP_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("friend request {id}")))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM friendships WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_friends(&self, user_id: i64) -> Result<Vec<FriendEntry>> {
        let rows = sqlx::query_as::<_, FriendEntry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM friendships f
            JOIN users u ON u.id = CASE
                WHEN f.requester_id = ? THEN f.addressee_id
                ELSE f.requester_id
            END
            WHERE f.status = 'accepted'
              AND (f.requester_id = ? OR f.addressee_id = ?)
            ORDER BY u.username COLLATE NOCASE
            "#
        ))
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_received(&self, user_id: i64) -> Result<Vec<FriendEntry>> {
        let rows = sqlx::query_as::<_, FriendEntry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM friendships f
            JOIN users u ON u.id = f.requester_id
            WHERE f.status = 'pending' AND f.addressee_id = ?
            ORDER BY f.id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_sent(&self, user_id: i64) -> Result<Vec<FriendEntry>> {
        let rows = sqlx::query_as::<_, FriendEntry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM friendships f
            JOIN users u ON u.id = f.addressee_id
            WHERE f.status = 'pending' AND f.requester_id = ?
            ORDER BY f.id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
