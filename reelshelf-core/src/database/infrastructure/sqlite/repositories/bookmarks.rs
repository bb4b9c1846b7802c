use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::catalog::MediaType;
use crate::database::ports::BookmarksRepository;
use crate::error::Result;
use crate::social::{Bookmark, NewBookmark};

const BOOKMARK_COLUMNS: &str =
    "id, user_id, content_type, content_id, title, poster_path, created_at";

#[derive(Clone, Debug)]
pub struct SqliteBookmarksRepository {
    pool: SqlitePool,
}

impl SqliteBookmarksRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookmarksRepository for SqliteBookmarksRepository {
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Bookmark>> {
        let rows = sqlx::query_as::<_, Bookmark>(&format!(
            "SELECT {BOOKMARK_COLUMNS} FROM bookmarks \
             WHERE user_id = ? ORDER BY id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn add(
        &self,
        user_id: i64,
        bookmark: &NewBookmark,
    ) -> Result<Bookmark> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO bookmarks
                (user_id, content_type, content_id, title, poster_path, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, content_type, content_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(bookmark.content_type)
        .bind(&bookmark.content_id)
        .bind(&bookmark.title)
        .bind(&bookmark.poster_path)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let stored = sqlx::query_as::<_, Bookmark>(&format!(
            "SELECT {BOOKMARK_COLUMNS} FROM bookmarks \
             WHERE user_id = ? AND content_type = ? AND content_id = ?"
        ))
        .bind(user_id)
        .bind(bookmark.content_type)
        .bind(&bookmark.content_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stored)
    }

    async fn remove(
        &self,
        user_id: i64,
        content_type: MediaType,
        content_id: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM bookmarks \
             WHERE user_id = ? AND content_type = ? AND content_id = ?",
        )
        .bind(user_id)
        .bind(content_type)
        .bind(content_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(
        &self,
        user_id: i64,
        content_type: MediaType,
        content_id: &str,
    ) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS (SELECT 1 FROM bookmarks \
             WHERE user_id = ? AND content_type = ? AND content_id = ?)",
        )
        .bind(user_id)
        .bind(content_type)
        .bind(content_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(found != 0)
    }
}
