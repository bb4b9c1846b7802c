//! Bookmarks, comments and the friendship graph.

pub mod bookmarks;
pub mod comments;
pub mod friends;
pub mod model;

pub use bookmarks::BookmarkService;
pub use comments::CommentService;
pub use friends::FriendService;
pub use model::{
    Bookmark, Comment, FriendEntry, Friendship, FriendshipStatus, NewBookmark,
    NewComment, RelationStatus, RelationView,
};

use crate::error::{CoreError, Result};

const MAX_CONTENT_ID_LEN: usize = 128;

/// Catalog ids are short opaque tokens.
pub(crate) fn validate_content_id(content_id: &str) -> Result<()> {
    let ok = !content_id.is_empty()
        && content_id.len() <= MAX_CONTENT_ID_LEN
        && content_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if ok {
        Ok(())
    } else {
        Err(CoreError::InvalidRequest(format!(
            "invalid content id '{content_id}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::validate_content_id;

    #[test]
    fn content_ids_are_opaque_tokens() {
        assert!(validate_content_id("603").is_ok());
        assert!(validate_content_id("OL45804W").is_ok());
        assert!(validate_content_id("zyTC-AlF_PjgYC").is_ok());
        assert!(validate_content_id("").is_err());
        assert!(validate_content_id("a/b").is_err());
        assert!(validate_content_id(&"x".repeat(129)).is_err());
    }
}
