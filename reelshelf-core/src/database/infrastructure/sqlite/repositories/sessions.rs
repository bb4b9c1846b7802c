use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::database::ports::{Session, SessionsRepository};
use crate::error::Result;
use crate::users::User;

#[derive(Debug, FromRow)]
struct ActiveSessionRow {
    session_id: i64,
    expires_at: i64,
    #[sqlx(flatten)]
    user: User,
}

#[derive(Clone, Debug)]
pub struct SqliteSessionsRepository {
    pool: SqlitePool,
}

impl SqliteSessionsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionsRepository for SqliteSessionsRepository {
    async fn create_session(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token_hash, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, expires_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(Utc::now().timestamp())
        .bind(expires_at.timestamp())
        .fetch_one(&self.pool)
        .await?;
        Ok(session)
    }

    async fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<(Session, User)>> {
        let row = sqlx::query_as::<_, ActiveSessionRow>(
            r#"
            SELECT s.id AS session_id, s.expires_at,
                   u.id, u.username, u.email, u.avatar_url, u.role, u.created_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = ? AND s.expires_at > ?
            "#,
        )
        .bind(token_hash)
        .bind(now.timestamp())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| {
            (
                Session {
                    id: r.session_id,
                    user_id: r.user.id,
                    expires_at: r.expires_at,
                },
                r.user,
            )
        }))
    }

    async fn delete_session(&self, session_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_other_sessions(
        &self,
        user_id: i64,
        keep: i64,
    ) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM sessions WHERE user_id = ? AND id <> ?")
                .bind(user_id)
                .bind(keep)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
