use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::error::Result;
use crate::users::User;

/// A persisted bearer session. Only the token digest is stored.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub expires_at: i64,
}

impl Session {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }
}

#[async_trait]
pub trait SessionsRepository: Send + Sync {
    async fn create_session(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session>;
    /// Session and owner for a digest, if it has not expired at `now`.
    async fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<(Session, User)>>;
    async fn delete_session(&self, session_id: i64) -> Result<()>;
    /// Revoke every session of a user except `keep`.
    async fn delete_other_sessions(
        &self,
        user_id: i64,
        keep: i64,
    ) -> Result<u64>;
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}
