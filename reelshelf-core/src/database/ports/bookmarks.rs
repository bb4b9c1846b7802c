use async_trait::async_trait;

use crate::catalog::MediaType;
use crate::error::Result;
use crate::social::{Bookmark, NewBookmark};

#[async_trait]
pub trait BookmarksRepository: Send + Sync {
    /// Newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Bookmark>>;
    /// Insert unless the item is already bookmarked; returns the stored row
    /// either way.
    async fn add(&self, user_id: i64, bookmark: &NewBookmark)
    -> Result<Bookmark>;
    async fn remove(
        &self,
        user_id: i64,
        content_type: MediaType,
        content_id: &str,
    ) -> Result<bool>;
    async fn exists(
        &self,
        user_id: i64,
        content_type: MediaType,
        content_id: &str,
    ) -> Result<bool>;
}
