use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use serde::Deserialize;

use reelshelf_core::users::{PublicProfile, User};

use crate::infra::app_state::AppState;
use crate::infra::errors::AppResult;

#[derive(Debug, Default, Deserialize)]
pub struct UserSearchQuery {
    #[serde(default, alias = "query")]
    pub q: String,
}

/// Username substring search. The caller never appears in the results.
pub async fn search_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    query: Result<Query<UserSearchQuery>, QueryRejection>,
) -> AppResult<Json<Vec<PublicProfile>>> {
    let Query(query) = query?;
    Ok(Json(state.users.search(user.id, &query.q).await?))
}

pub async fn public_profile_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<PublicProfile>> {
    let Path(id) = id?;
    Ok(Json(state.users.public_profile(id).await?))
}
