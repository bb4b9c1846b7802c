use std::fmt;
use std::sync::Arc;

use crate::catalog::MediaType;
use crate::catalog::normalize::UNTITLED;
use crate::database::ports::{BookmarksRepository, UsersRepository};
use crate::error::{CoreError, Result};

use super::model::{Bookmark, MAX_BOOKMARK_TITLE_LEN, NewBookmark};
use super::validate_content_id;

#[derive(Clone)]
pub struct BookmarkService {
    bookmarks: Arc<dyn BookmarksRepository>,
    users: Arc<dyn UsersRepository>,
}

impl fmt::Debug for BookmarkService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookmarkService").finish_non_exhaustive()
    }
}

impl BookmarkService {
    pub fn new(
        bookmarks: Arc<dyn BookmarksRepository>,
        users: Arc<dyn UsersRepository>,
    ) -> Self {
        Self { bookmarks, users }
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<Bookmark>> {
        self.bookmarks.list_for_user(user_id).await
    }

    /// Bookmark an item. Re-adding returns the existing bookmark.
    pub async fn add(
        &self,
        user_id: i64,
        request: &NewBookmark,
    ) -> Result<Bookmark> {
        validate_content_id(&request.content_id)?;

        let title: String = match request.title.trim() {
            "" => UNTITLED.to_string(),
            t => t.chars().take(MAX_BOOKMARK_TITLE_LEN).collect(),
        };
        let poster_path = request
            .poster_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        self.bookmarks
            .add(
                user_id,
                &NewBookmark {
                    content_type: request.content_type,
                    content_id: request.content_id.clone(),
                    title,
                    poster_path,
                },
            )
            .await
    }

    pub async fn remove(
        &self,
        user_id: i64,
        content_type: MediaType,
        content_id: &str,
    ) -> Result<()> {
        if self
            .bookmarks
            .remove(user_id, content_type, content_id)
            .await?
        {
            Ok(())
        } else {
            Err(CoreError::NotFound(format!(
                "bookmark {content_type}/{content_id}"
            )))
        }
    }

    pub async fn is_bookmarked(
        &self,
        user_id: i64,
        content_type: MediaType,
        content_id: &str,
    ) -> Result<bool> {
        self.bookmarks
            .exists(user_id, content_type, content_id)
            .await
    }

    /// Another user's bookmarks, visible to anyone.
    pub async fn public_list(&self, user_id: i64) -> Result<Vec<Bookmark>> {
        if self.users.get_user_by_id(user_id).await?.is_none() {
            return Err(CoreError::NotFound(format!("user {user_id}")));
        }
        self.bookmarks.list_for_user(user_id).await
    }
}
