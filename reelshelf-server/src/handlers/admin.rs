use axum::{
    Extension, Json,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
};
use tracing::info;

use reelshelf_core::social::Comment;
use reelshelf_core::users::User;

use crate::infra::app_state::AppState;
use crate::infra::errors::AppResult;

pub async fn list_users_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.admin.users().await?))
}

pub async fn list_comments_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(state.admin.comments().await?))
}

/// Delete an account together with its sessions, bookmarks, comments and
/// friendships. Admins cannot delete themselves.
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(admin): Extension<User>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.admin.delete_user(&admin, id).await?;
    info!(admin_id = admin.id, user_id = id, "user deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_comment_handler(
    State(state): State<AppState>,
    Extension(admin): Extension<User>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.admin.delete_comment(&admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
