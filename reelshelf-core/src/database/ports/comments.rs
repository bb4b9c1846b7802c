use async_trait::async_trait;

use crate::catalog::MediaType;
use crate::error::Result;
use crate::social::{Comment, NewComment};

#[async_trait]
pub trait CommentsRepository: Send + Sync {
    /// Newest first.
    async fn list_for_content(
        &self,
        content_type: MediaType,
        content_id: &str,
    ) -> Result<Vec<Comment>>;
    async fn create(&self, user_id: i64, comment: &NewComment)
    -> Result<Comment>;
    async fn get(&self, id: i64) -> Result<Option<Comment>>;
    async fn delete(&self, id: i64) -> Result<bool>;
    /// Every comment, newest first, for moderation.
    async fn list_all(&self) -> Result<Vec<Comment>>;
}
