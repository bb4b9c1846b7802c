//! # ReelShelf Core
//!
//! Core library for the ReelShelf media-catalog service: catalog
//! aggregation over TMDB, Google Books and Open Library, accounts with
//! opaque session tokens, bookmarks, comments, the friendship graph and
//! their SQLite persistence.
//!
//! ## Architecture
//!
//! - [`catalog`]: upstream adapters, card normalization, page translation
//!   and the batch cache
//! - [`auth`]: password hashing, session tokens and [`auth::AuthService`]
//! - [`users`], [`social`], [`admin`]: account, social and moderation
//!   services
//! - [`database`]: repository ports and their SQLite implementations
//! - [`api`]: versioned route paths shared with clients
//!
//! ## Example
//!
//! ```no_run
//! use reelshelf_core::catalog::{
//!     CatalogService, CatalogSettings, CatalogSource, GoogleBooksAdapter,
//!     OpenLibraryAdapter, SearchRequest, TmdbAdapter,
//! };
//! use reelshelf_core::catalog::providers::http_client;
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let http = http_client(Duration::from_secs(10))?;
//! let catalog = CatalogService::new(
//!     TmdbAdapter::new(http.clone(), std::env::var("TMDB_API_KEY").ok()),
//!     GoogleBooksAdapter::new(http.clone(), None),
//!     OpenLibraryAdapter::new(http),
//!     CatalogSettings::default(),
//! );
//!
//! let page = catalog
//!     .search(&SearchRequest::new(CatalogSource::OpenLibrary, "dune"))
//!     .await;
//! println!("{} cards, more: {}", page.items.len(), page.has_next);
//! # Ok(())
//! # }
//! ```

/// Moderation: listing and deleting any user or comment
pub mod admin;
/// Versioned HTTP route paths
pub mod api;
/// Password hashing, session tokens and account lifecycle
pub mod auth;
/// Movie and book search across upstream catalogs
pub mod catalog;
/// Repository ports and the SQLite backend
pub mod database;
pub mod error;
/// Bookmarks, comments and friendships
pub mod social;
/// Accounts, profiles and request validation
pub mod users;

pub use error::{CoreError, Result};
