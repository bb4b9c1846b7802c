use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::info;

use crate::database::ports::UsersRepository;
use crate::error::{CoreError, Result};
use crate::users::{NewUser, PublicProfile, User, UserCredentials};

const USER_COLUMNS: &str = "id, username, email, avatar_url, role, created_at";

/// Escape LIKE wildcards so user input matches literally.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn map_unique(e: sqlx::Error, action: &str) -> CoreError {
    if let Some(db_err) = e.as_database_error()
        && db_err.is_unique_violation()
    {
        if db_err.message().contains("users.email") {
            return CoreError::Conflict("Email already exists".to_string());
        }
        return CoreError::Conflict("Username already exists".to_string());
    }
    CoreError::Internal(format!("Failed to {action}: {e}"))
}

/// SQLite-backed implementation of the `UsersRepository` port.
#[derive(Clone, Debug)]
pub struct SqliteUsersRepository {
    pool: SqlitePool,
}

impl SqliteUsersRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl UsersRepository for SqliteUsersRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, role, created_at)
            VALUES (
                ?, ?, ?,
                CASE WHEN EXISTS (SELECT 1 FROM users) THEN 'user' ELSE 'admin' END,
                ?
            )
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_unique(e, "create user"))?;

        info!(
            user_id = created.id,
            role = ?created.role,
            "created user {}",
            created.username
        );
        Ok(created)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    async fn get_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>> {
        let creds = sqlx::query_as::<_, UserCredentials>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users \
             WHERE username = ? COLLATE NOCASE"
        ))
        .bind(username)
        .fetch_optional(self.pool())
        .await?;
        Ok(creds)
    }

    async fn get_password_hash(&self, user_id: i64) -> Result<Option<String>> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(hash)
    }

    async fn update_password(
        &self,
        user_id: i64,
        password_hash: &str,
    ) -> Result<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
                .bind(password_hash)
                .bind(user_id)
                .execute(self.pool())
                .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("user {user_id}")));
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: i64,
        username: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE(?, username),
                avatar_url = CASE WHEN ? THEN NULLIF(?, '') ELSE avatar_url END
            WHERE id = ?
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(avatar_url.is_some())
        .bind(avatar_url)
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_unique(e, "update profile"))?
        .ok_or_else(|| CoreError::NotFound(format!("user {user_id}")))
    }

    async fn search_users(
        &self,
        needle: &str,
        exclude_id: i64,
        limit: u32,
    ) -> Result<Vec<PublicProfile>> {
        let users = sqlx::query_as::<_, PublicProfile>(
            r#"
            SELECT id, username, avatar_url, created_at
            FROM users
            WHERE username LIKE ? ESCAPE '\' AND id <> ?
            ORDER BY username COLLATE NOCASE
            LIMIT ?
            "#,
        )
        .bind(like_pattern(needle))
        .bind(exclude_id)
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await?;
        Ok(users)
    }

    async fn get_all_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(users)
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
