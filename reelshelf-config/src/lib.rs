//! Configuration library for ReelShelf.
//!
//! A [`Config`] is composed from environment variables, an optional TOML
//! file and built-in defaults, in that order of precedence, then checked
//! against guard rails before the server may start.

/// Built-in defaults
pub mod constants;
/// Layered loading of file, environment and defaults
pub mod loader;
/// The resolved configuration tree
pub mod models;
/// Raw file and environment inputs
pub mod sources;
pub mod util;
/// Guard rails and startup warnings
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::{
    AuthConfig, CatalogConfig, Config, ConfigMetadata, CorsConfig,
    DatabaseConfig, GoogleBooksConfig, OpenLibraryConfig, ServerConfig,
    TmdbConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
