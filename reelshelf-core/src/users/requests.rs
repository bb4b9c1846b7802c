use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::User;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_AVATAR_URL_LEN: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "Invalid username: must be 3-30 characters, alphanumeric or underscore"
    )]
    InvalidUsername,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password too short: minimum 8 characters required")]
    PasswordTooShort,

    #[error("Invalid avatar URL: must be an http(s) URL")]
    InvalidAvatarUrl,

    #[error("Comment must be between 1 and 2000 characters")]
    InvalidCommentLength,
}

/// Username: 3-30 chars, alphanumeric + underscore.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if !(3..=30).contains(&len) {
        return Err(ValidationError::InvalidUsername);
    }

    if !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidUsername);
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };

    let plausible = !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
        && email.len() <= 254
        && !email.chars().any(char::is_whitespace);

    if plausible {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

pub fn validate_avatar_url(url: &str) -> Result<(), ValidationError> {
    let parsed =
        url::Url::parse(url).map_err(|_| ValidationError::InvalidAvatarUrl)?;
    if !matches!(parsed.scheme(), "http" | "https")
        || url.len() > MAX_AVATAR_URL_LEN
    {
        return Err(ValidationError::InvalidAvatarUrl);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired username.
    #[serde(alias = "username")]
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Validate registration request
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_username(self.name.trim())?;
        validate_email(self.email.trim())?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request to update the caller's profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref name) = self.username {
            validate_username(name.trim())?;
        }

        if let Some(ref url) = self.avatar_url
            && !url.trim().is_empty()
        {
            validate_avatar_url(url.trim())?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(alias = "current_password")]
    pub current_password: String,
    #[serde(alias = "new_password")]
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_password(&self.new_password)
    }
}

/// Successful register/login payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}
