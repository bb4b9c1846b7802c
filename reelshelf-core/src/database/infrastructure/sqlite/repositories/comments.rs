use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::catalog::MediaType;
use crate::database::ports::CommentsRepository;
use crate::error::Result;
use crate::social::{Comment, NewComment};

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.user_id, u.username, u.avatar_url,
           c.content_type, c.content_id, c.text, c.created_at
    FROM comments c
    JOIN users u ON u.id = c.user_id
"#;

#[derive(Clone, Debug)]
pub struct SqliteCommentsRepository {
    pool: SqlitePool,
}

impl SqliteCommentsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentsRepository for SqliteCommentsRepository {
    async fn list_for_content(
        &self,
        content_type: MediaType,
        content_id: &str,
    ) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(&format!(
            "{COMMENT_SELECT} WHERE c.content_type = ? AND c.content_id = ? \
             ORDER BY c.id DESC"
        ))
        .bind(content_type)
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create(
        &self,
        user_id: i64,
        comment: &NewComment,
    ) -> Result<Comment> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO comments (user_id, content_type, content_id, text, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(comment.content_type)
        .bind(&comment.content_id)
        .bind(&comment.text)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let stored =
            sqlx::query_as::<_, Comment>(&format!("{COMMENT_SELECT} WHERE c.id = ?"))
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(stored)
    }

    async fn get(&self, id: i64) -> Result<Option<Comment>> {
        let row =
            sqlx::query_as::<_, Comment>(&format!("{COMMENT_SELECT} WHERE c.id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(&format!(
            "{COMMENT_SELECT} ORDER BY c.id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
