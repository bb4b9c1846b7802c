use std::fmt;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use super::crypto::AuthCrypto;
use crate::database::ports::{Session, SessionsRepository, UsersRepository};
use crate::error::{CoreError, Result};
use crate::users::{
    AuthResponse, ChangePasswordRequest, LoginRequest, NewUser,
    RegisterRequest, UpdateProfileRequest, User,
};

/// The caller behind a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub session: Session,
}

/// Account registration, login and opaque-token sessions.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UsersRepository>,
    sessions: Arc<dyn SessionsRepository>,
    crypto: Arc<AuthCrypto>,
    session_ttl: Duration,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        sessions: Arc<dyn SessionsRepository>,
        crypto: Arc<AuthCrypto>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            crypto,
            session_ttl,
        }
    }

    async fn issue_session(&self, user: User) -> Result<AuthResponse> {
        let token = self.crypto.generate_session_token()?;
        let digest = self.crypto.hash_token(&token)?;
        let expires_at = Utc::now() + self.session_ttl;
        self.sessions
            .create_session(user.id, &digest, expires_at)
            .await?;
        Ok(AuthResponse { user, token })
    }

    /// Create an account and sign it in. The first account becomes admin.
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<AuthResponse> {
        request.validate()?;

        let password_hash = self.crypto.hash_password(&request.password)?;
        let user = self
            .users
            .create_user(&NewUser {
                username: request.name.trim().to_string(),
                email: request.email.trim().to_lowercase(),
                password_hash,
                created_at: Utc::now(),
            })
            .await?;

        self.issue_session(user).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        let creds = self
            .users
            .get_credentials_by_username(request.username.trim())
            .await?
            .ok_or(CoreError::InvalidCredentials)?;

        if !self
            .crypto
            .verify_password(&request.password, &creds.password_hash)?
        {
            debug!(user_id = creds.user.id, "password mismatch");
            return Err(CoreError::InvalidCredentials);
        }

        info!(user_id = creds.user.id, "user logged in");
        self.issue_session(creds.user).await
    }

    /// Resolve a presented bearer token. `None` for unknown or expired
    /// tokens.
    pub async fn authenticate(
        &self,
        token: &str,
    ) -> Result<Option<AuthenticatedUser>> {
        let digest = self.crypto.hash_token(token)?;
        let found = self.sessions.find_active(&digest, Utc::now()).await?;
        Ok(found.map(|(session, user)| AuthenticatedUser { user, session }))
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        request: &UpdateProfileRequest,
    ) -> Result<User> {
        request.validate()?;

        let username = request.username.as_deref().map(str::trim);
        let avatar = request.avatar_url.as_deref().map(str::trim);
        self.users.update_profile(user_id, username, avatar).await
    }

    /// Replace the password and revoke every other session of the user.
    pub async fn change_password(
        &self,
        current: &AuthenticatedUser,
        request: &ChangePasswordRequest,
    ) -> Result<()> {
        request.validate()?;

        let user_id = current.user.id;
        let stored = self
            .users
            .get_password_hash(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("user {user_id}")))?;

        if !self
            .crypto
            .verify_password(&request.current_password, &stored)?
        {
            return Err(CoreError::InvalidCredentials);
        }

        let new_hash = self.crypto.hash_password(&request.new_password)?;
        self.users.update_password(user_id, &new_hash).await?;

        let revoked = self
            .sessions
            .delete_other_sessions(user_id, current.session.id)
            .await?;
        info!(user_id, revoked, "password changed");
        Ok(())
    }

    pub async fn logout(&self, current: &AuthenticatedUser) -> Result<()> {
        self.sessions.delete_session(current.session.id).await
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        self.sessions.purge_expired(Utc::now()).await
    }
}
