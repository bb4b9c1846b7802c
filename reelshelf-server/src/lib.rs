//! # ReelShelf Server
//!
//! axum application exposing the ReelShelf catalog and social API under
//! `/api/v1`: movie and book discovery backed by TMDB, Google Books and
//! Open Library, plus accounts, bookmarks, comments and friendships stored
//! in SQLite.

pub mod app;
pub mod handlers;
pub mod infra;
pub mod middleware;
pub mod routes;

pub use app::create_app;
pub use infra::app_state::AppState;
