use std::fmt;
use std::sync::Arc;

use crate::database::ports::UsersRepository;
use crate::error::{CoreError, Result};

use super::model::PublicProfile;

/// Longest accepted search needle.
const MAX_NEEDLE_LEN: usize = 64;
pub const SEARCH_LIMIT: u32 = 20;

/// Public directory of accounts.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UsersRepository>,
}

impl fmt::Debug for UserService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

impl UserService {
    pub fn new(users: Arc<dyn UsersRepository>) -> Self {
        Self { users }
    }

    /// Case-insensitive substring search on usernames, never returning the
    /// caller. A blank needle yields nothing.
    pub async fn search(
        &self,
        caller_id: i64,
        needle: &str,
    ) -> Result<Vec<PublicProfile>> {
        let needle = needle.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        if needle.chars().count() > MAX_NEEDLE_LEN {
            return Err(CoreError::InvalidRequest(
                "search query is too long".to_string(),
            ));
        }

        self.users
            .search_users(needle, caller_id, SEARCH_LIMIT)
            .await
    }

    pub async fn public_profile(&self, id: i64) -> Result<PublicProfile> {
        self.users
            .get_user_by_id(id)
            .await?
            .map(|user| user.public_profile())
            .ok_or_else(|| CoreError::NotFound(format!("user {id}")))
    }
}
