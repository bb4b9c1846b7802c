use async_trait::async_trait;

use crate::error::Result;
use crate::users::{NewUser, PublicProfile, User, UserCredentials};

// Account storage and lookup
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Insert an account. The very first account is created as admin.
    async fn create_user(&self, user: &NewUser) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    /// Case-insensitive lookup, including the password hash.
    async fn get_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>>;
    async fn get_password_hash(&self, user_id: i64) -> Result<Option<String>>;
    async fn update_password(
        &self,
        user_id: i64,
        password_hash: &str,
    ) -> Result<()>;
    /// `None` fields are left untouched; an empty avatar clears it.
    async fn update_profile(
        &self,
        user_id: i64,
        username: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<User>;
    async fn search_users(
        &self,
        needle: &str,
        exclude_id: i64,
        limit: u32,
    ) -> Result<Vec<PublicProfile>>;
    async fn get_all_users(&self) -> Result<Vec<User>>;
    /// Returns whether a row was removed.
    async fn delete_user(&self, id: i64) -> Result<bool>;
}
