use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::Serialize;

use reelshelf_core::catalog::MediaType;
use reelshelf_core::social::{Bookmark, NewBookmark};
use reelshelf_core::users::User;

use crate::infra::app_state::AppState;
use crate::infra::errors::AppResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkCheck {
    pub is_bookmarked: bool,
}

/// The caller's bookmarks, newest first.
pub async fn list_bookmarks_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<Vec<Bookmark>>> {
    Ok(Json(state.bookmarks.list(user.id).await?))
}

/// Bookmark an item. Adding the same item twice returns the original row.
pub async fn add_bookmark_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<NewBookmark>, JsonRejection>,
) -> AppResult<Json<Bookmark>> {
    let Json(request) = payload?;
    Ok(Json(state.bookmarks.add(user.id, &request).await?))
}

pub async fn remove_bookmark_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    path: Result<Path<(MediaType, String)>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path((content_type, content_id)) = path?;
    state
        .bookmarks
        .remove(user.id, content_type, &content_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn check_bookmark_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    path: Result<Path<(MediaType, String)>, PathRejection>,
) -> AppResult<Json<BookmarkCheck>> {
    let Path((content_type, content_id)) = path?;
    let is_bookmarked = state
        .bookmarks
        .is_bookmarked(user.id, content_type, &content_id)
        .await?;
    Ok(Json(BookmarkCheck { is_bookmarked }))
}

/// Anyone may browse another user's bookmarks.
pub async fn public_bookmarks_handler(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Vec<Bookmark>>> {
    let Path(user_id) = user_id?;
    Ok(Json(state.bookmarks.public_list(user_id).await?))
}
