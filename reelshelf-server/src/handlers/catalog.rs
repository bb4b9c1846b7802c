use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use serde::Deserialize;

use reelshelf_core::catalog::model::empty_as_none;
use reelshelf_core::catalog::{
    CatalogSource, Genre, MediaDetail, MovieSort, PersonDetail, SearchRequest,
    SearchResponse,
};

use crate::infra::app_state::AppState;
use crate::infra::errors::{AppError, AppResult};

/// Query string for `/movies`; the source is always TMDB.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default, alias = "genreFilter")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub year: Option<u16>,
    #[serde(default, alias = "sort_by", deserialize_with = "empty_as_none")]
    pub sort_by: Option<MovieSort>,
}

/// Query string for `/books/search`. Defaults to Google Books.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub source: Option<CatalogSource>,
    #[serde(default, alias = "genreFilter")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u32>,
}

fn checked_page(page: u32) -> AppResult<u32> {
    if page == 0 {
        return Err(AppError::bad_request("page must be at least 1"));
    }
    Ok(page)
}

fn search_request(
    source: CatalogSource,
    query: String,
    genre: Option<String>,
    page: Option<u32>,
) -> AppResult<SearchRequest> {
    let mut request = SearchRequest::new(source, query)
        .with_page(checked_page(page.unwrap_or(1))?);
    if let Some(genre) = genre {
        request = request.with_genre(genre);
    }
    Ok(request)
}

/// Unified search across every source.
///
/// Upstream failures do not change the status: the body carries an empty
/// `items` list and an `error` object instead.
pub async fn search_handler(
    State(state): State<AppState>,
    query: Result<Query<SearchRequest>, QueryRejection>,
) -> AppResult<Json<SearchResponse>> {
    let Query(request) = query?;
    checked_page(request.page)?;
    Ok(Json(state.catalog.search(&request).await))
}

pub async fn movies_handler(
    State(state): State<AppState>,
    query: Result<Query<MovieQuery>, QueryRejection>,
) -> AppResult<Json<SearchResponse>> {
    let Query(params) = query?;
    let mut request = search_request(
        CatalogSource::Tmdb,
        params.query,
        params.genre,
        params.page,
    )?;
    request.year = params.year;
    request.sort_by = params.sort_by;
    Ok(Json(state.catalog.search(&request).await))
}

pub async fn books_handler(
    State(state): State<AppState>,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> AppResult<Json<SearchResponse>> {
    let Query(params) = query?;
    let source = match params.source {
        None => CatalogSource::GoogleBooks,
        Some(CatalogSource::Tmdb) => {
            return Err(AppError::bad_request(
                "book searches use google_books or open_library",
            ));
        }
        Some(source) => source,
    };
    let request =
        search_request(source, params.query, params.genre, params.page)?;
    Ok(Json(state.catalog.search(&request).await))
}

pub async fn featured_handler(
    State(state): State<AppState>,
) -> Json<SearchResponse> {
    Json(state.catalog.featured().await)
}

pub async fn movie_genres_handler(
    State(state): State<AppState>,
) -> Json<Vec<Genre>> {
    Json(state.catalog.genres().await)
}

pub async fn book_genres_handler(
    State(state): State<AppState>,
) -> Json<Vec<Genre>> {
    Json(state.catalog.book_genres())
}

pub async fn movie_detail_handler(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> AppResult<Json<MediaDetail>> {
    let Path(id) = id?;
    Ok(Json(state.catalog.movie_detail(id).await?))
}

pub async fn person_detail_handler(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> AppResult<Json<PersonDetail>> {
    let Path(id) = id?;
    Ok(Json(state.catalog.person_detail(id).await?))
}

pub async fn google_book_detail_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MediaDetail>> {
    let id = checked_book_id(&id)?;
    Ok(Json(state.catalog.google_book_detail(id).await?))
}

pub async fn open_library_detail_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MediaDetail>> {
    let id = checked_book_id(&id)?;
    Ok(Json(state.catalog.open_library_book_detail(id).await?))
}

/// Book ids are interpolated into upstream paths.
fn checked_book_id(id: &str) -> AppResult<&str> {
    let id = id.trim();
    let valid = !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if valid {
        Ok(id)
    } else {
        Err(AppError::bad_request(format!("invalid book id '{id}'")))
    }
}
