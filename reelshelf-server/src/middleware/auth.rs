use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use reelshelf_core::users::User;

use crate::infra::app_state::AppState;
use crate::infra::errors::AppError;

/// Resolve the bearer token into the calling account. Inserts both the
/// [`reelshelf_core::auth::AuthenticatedUser`] and its [`User`] into the
/// request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request)
        .map(str::to_owned)
        .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

    let current = state
        .auth_service
        .authenticate(&token)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;

    request.extensions_mut().insert(current.user.clone());
    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}

/// Must be layered inside [`require_auth`].
pub async fn require_admin(request: Request, next: Next) -> Response {
    let is_admin = match request.extensions().get::<User>() {
        Some(user) => user.is_admin(),
        None => {
            return AppError::unauthorized("Authentication required")
                .into_response();
        }
    };

    if !is_admin {
        return AppError::forbidden("Admin access required").into_response();
    }

    next.run(request).await
}

fn extract_bearer_token(request: &Request) -> Option<&str> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;

    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
