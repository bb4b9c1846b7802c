//! Moderation operations. Callers must already be verified admins.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::database::ports::{CommentsRepository, UsersRepository};
use crate::error::{CoreError, Result};
use crate::social::Comment;
use crate::users::User;

#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UsersRepository>,
    comments: Arc<dyn CommentsRepository>,
}

impl fmt::Debug for AdminService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminService").finish_non_exhaustive()
    }
}

impl AdminService {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        comments: Arc<dyn CommentsRepository>,
    ) -> Self {
        Self { users, comments }
    }

    pub async fn users(&self) -> Result<Vec<User>> {
        self.users.get_all_users().await
    }

    pub async fn comments(&self) -> Result<Vec<Comment>> {
        self.comments.list_all().await
    }

    /// Delete an account with everything it owns. Admins cannot delete
    /// themselves.
    pub async fn delete_user(&self, admin: &User, user_id: i64) -> Result<()> {
        if admin.id == user_id {
            return Err(CoreError::InvalidRequest(
                "admins cannot delete their own account".to_string(),
            ));
        }
        if !self.users.delete_user(user_id).await? {
            return Err(CoreError::NotFound(format!("user {user_id}")));
        }
        info!(admin_id = admin.id, user_id, "user deleted");
        Ok(())
    }

    pub async fn delete_comment(
        &self,
        admin: &User,
        comment_id: i64,
    ) -> Result<()> {
        if !self.comments.delete(comment_id).await? {
            return Err(CoreError::NotFound(format!("comment {comment_id}")));
        }
        info!(admin_id = admin.id, comment_id, "comment deleted");
        Ok(())
    }
}
