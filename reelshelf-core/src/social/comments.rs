use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::catalog::MediaType;
use crate::database::ports::CommentsRepository;
use crate::error::{CoreError, Result};
use crate::users::{User, ValidationError};

use super::model::{Comment, MAX_COMMENT_LEN, NewComment};
use super::validate_content_id;

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentsRepository>,
}

impl fmt::Debug for CommentService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommentService").finish_non_exhaustive()
    }
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentsRepository>) -> Self {
        Self { comments }
    }

    pub async fn list(
        &self,
        content_type: MediaType,
        content_id: &str,
    ) -> Result<Vec<Comment>> {
        self.comments
            .list_for_content(content_type, content_id)
            .await
    }

    pub async fn create(
        &self,
        author: &User,
        request: &NewComment,
    ) -> Result<Comment> {
        validate_content_id(&request.content_id)?;

        let text = request.text.trim();
        let len = text.chars().count();
        if len == 0 || len > MAX_COMMENT_LEN {
            return Err(ValidationError::InvalidCommentLength.into());
        }

        self.comments
            .create(
                author.id,
                &NewComment {
                    content_type: request.content_type,
                    content_id: request.content_id.clone(),
                    text: text.to_string(),
                },
            )
            .await
    }

    /// Authors may delete their own comments; admins may delete any.
    pub async fn delete(&self, actor: &User, id: i64) -> Result<()> {
        let comment = self
            .comments
            .get(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("comment {id}")))?;

        if comment.user_id != actor.id && !actor.is_admin() {
            return Err(CoreError::Forbidden(
                "cannot delete another user's comment".to_string(),
            ));
        }

        self.comments.delete(id).await?;
        if comment.user_id != actor.id {
            info!(comment_id = id, admin_id = actor.id, "comment moderated");
        }
        Ok(())
    }
}
