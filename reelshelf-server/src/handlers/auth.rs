use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use tracing::info;

use reelshelf_core::auth::AuthenticatedUser;
use reelshelf_core::users::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest,
    UpdateProfileRequest, User,
};

use crate::infra::app_state::AppState;
use crate::infra::errors::AppResult;

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: User,
}

/// Create an account and return it with a fresh bearer token.
///
/// The first account ever registered is promoted to admin.
///
/// # Responses
///
/// - `201 Created` with `{ user, token }`
/// - `400 Bad Request` for an invalid username, email or password
/// - `409 Conflict` when the username or email is taken
pub async fn register_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let Json(request) = payload?;
    let response = state.auth_service.register(&request).await?;
    info!(user_id = response.user.id, role = ?response.user.role, "account registered");
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<AuthResponse>> {
    let Json(request) = payload?;
    let response = state.auth_service.login(&request).await?;
    Ok(Json(response))
}

pub async fn me_handler(Extension(user): Extension<User>) -> Json<UserEnvelope> {
    Json(UserEnvelope { user })
}

/// Change username and/or avatar. An empty `avatar_url` clears it.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> AppResult<Json<UserEnvelope>> {
    let Json(request) = payload?;
    let user = state.auth_service.update_profile(user.id, &request).await?;
    Ok(Json(UserEnvelope { user }))
}

/// Replace the password after checking the current one. Every other
/// session of the account is revoked.
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(request) = payload?;
    state
        .auth_service
        .change_password(&current, &request)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
) -> AppResult<StatusCode> {
    state.auth_service.logout(&current).await?;
    Ok(StatusCode::NO_CONTENT)
}
