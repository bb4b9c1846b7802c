use async_trait::async_trait;

use crate::error::Result;
use crate::social::{FriendEntry, Friendship};

#[async_trait]
pub trait FriendshipsRepository: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<Friendship>>;
    /// The relation between two users in either direction.
    async fn find_between(&self, a: i64, b: i64) -> Result<Option<Friendship>>;
    async fn create_request(
        &self,
        requester_id: i64,
        addressee_id: i64,
    ) -> Result<Friendship>;
    async fn accept(&self, id: i64) -> Result<Friendship>;
    async fn delete(&self, id: i64) -> Result<bool>;
    async fn list_friends(&self, user_id: i64) -> Result<Vec<FriendEntry>>;
    async fn list_received(&self, user_id: i64) -> Result<Vec<FriendEntry>>;
    async fn list_sent(&self, user_id: i64) -> Result<Vec<FriendEntry>>;
}
