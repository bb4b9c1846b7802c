use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use reelshelf_core::catalog::MediaType;
use reelshelf_core::social::{Comment, NewComment};
use reelshelf_core::users::User;

use crate::infra::app_state::AppState;
use crate::infra::errors::AppResult;

pub async fn list_comments_handler(
    State(state): State<AppState>,
    path: Result<Path<(MediaType, String)>, PathRejection>,
) -> AppResult<Json<Vec<Comment>>> {
    let Path((content_type, content_id)) = path?;
    Ok(Json(state.comments.list(content_type, &content_id).await?))
}

pub async fn create_comment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let Json(request) = payload?;
    let comment = state.comments.create(&user, &request).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Authors delete their own comments; admins may delete any.
pub async fn delete_comment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.comments.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
