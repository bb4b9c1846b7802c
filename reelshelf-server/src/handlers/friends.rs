use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;

use reelshelf_core::social::{FriendEntry, Friendship, RelationView};
use reelshelf_core::users::User;

use crate::infra::app_state::AppState;
use crate::infra::errors::AppResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestBody {
    #[serde(alias = "receiver_id")]
    pub receiver_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptRequestBody {
    #[serde(alias = "relation_id")]
    pub relation_id: i64,
}

/// Send a friend request. When the other user already asked us, their
/// request is accepted instead of opening a second one.
pub async fn send_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<FriendRequestBody>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Friendship>)> {
    let Json(body) = payload?;
    let relation = state.friends.request(user.id, body.receiver_id).await?;
    Ok((StatusCode::CREATED, Json(relation)))
}

pub async fn accept_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<AcceptRequestBody>, JsonRejection>,
) -> AppResult<Json<Friendship>> {
    let Json(body) = payload?;
    Ok(Json(state.friends.accept(user.id, body.relation_id).await?))
}

/// Cancel, decline or unfriend, depending on the relation's state.
pub async fn remove_relation_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    relation_id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(relation_id) = relation_id?;
    state.friends.remove(user.id, relation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_friends_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<Vec<FriendEntry>>> {
    Ok(Json(state.friends.friends(user.id).await?))
}

pub async fn received_requests_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<Vec<FriendEntry>>> {
    Ok(Json(state.friends.received_requests(user.id).await?))
}

pub async fn sent_requests_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<Vec<FriendEntry>>> {
    Ok(Json(state.friends.sent_requests(user.id).await?))
}

pub async fn relation_status_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    other_id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<RelationView>> {
    let Path(other_id) = other_id?;
    Ok(Json(state.friends.status(user.id, other_id).await?))
}
