use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::CONFIG_PATH_ENV;
use crate::util::{non_blank, parse_bool, parse_csv};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    #[serde(default)]
    pub catalog: FileCatalogConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_headers: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_pepper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_ttl_hours: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCatalogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_page: Option<u32>,
    #[serde(default)]
    pub tmdb: FileTmdbConfig,
    #[serde(default)]
    pub google_books: FileGoogleBooksConfig,
    #[serde(default)]
    pub open_library: FileOpenLibraryConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileTmdbConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileGoogleBooksConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileOpenLibraryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub covers_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub cors_allowed_methods: Option<Vec<String>>,
    pub cors_allowed_headers: Option<Vec<String>>,
    pub dev_mode: Option<bool>,
    pub auth_password_pepper: Option<String>,
    pub auth_token_key: Option<String>,
    pub session_ttl_hours: Option<u64>,
    pub catalog_page_size: Option<u32>,
    pub catalog_request_timeout_secs: Option<u64>,
    pub catalog_cache_ttl_secs: Option<u64>,
    pub catalog_cache_capacity: Option<usize>,
    pub catalog_max_page: Option<u32>,
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: Option<String>,
    pub tmdb_image_base_url: Option<String>,
    pub tmdb_language: Option<String>,
    pub google_books_api_key: Option<String>,
    pub google_books_base_url: Option<String>,
    pub google_books_batch_size: Option<u32>,
    pub open_library_base_url: Option<String>,
    pub open_library_covers_base_url: Option<String>,
    pub open_library_batch_size: Option<u32>,
}

impl EnvConfig {
    /// Read the process environment.
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str| lookup(name).and_then(non_blank);
        let csv = |name: &str| text(name).map(|raw| parse_csv(&raw));
        let flag = |name: &str| text(name).and_then(|raw| parse_bool(&raw));

        Self {
            config_path: text(CONFIG_PATH_ENV).map(PathBuf::from),
            server_host: text("SERVER_HOST"),
            server_port: parsed(&text, "SERVER_PORT"),
            database_url: text("DATABASE_URL"),

            cors_allowed_origins: csv("CORS_ALLOWED_ORIGINS"),
            cors_allowed_methods: csv("CORS_ALLOWED_METHODS"),
            cors_allowed_headers: csv("CORS_ALLOWED_HEADERS"),

            dev_mode: flag("DEV_MODE"),

            auth_password_pepper: text("AUTH_PASSWORD_PEPPER"),
            auth_token_key: text("AUTH_TOKEN_KEY"),
            session_ttl_hours: parsed(&text, "SESSION_TTL_HOURS"),

            catalog_page_size: parsed(&text, "CATALOG_PAGE_SIZE"),
            catalog_request_timeout_secs: parsed(
                &text,
                "CATALOG_REQUEST_TIMEOUT_SECS",
            ),
            catalog_cache_ttl_secs: parsed(&text, "CATALOG_CACHE_TTL_SECS"),
            catalog_cache_capacity: parsed(&text, "CATALOG_CACHE_CAPACITY"),
            catalog_max_page: parsed(&text, "CATALOG_MAX_PAGE"),

            tmdb_api_key: text("TMDB_API_KEY"),
            tmdb_base_url: text("TMDB_BASE_URL"),
            tmdb_image_base_url: text("TMDB_IMAGE_BASE_URL"),
            tmdb_language: text("TMDB_LANGUAGE"),

            google_books_api_key: text("GOOGLE_BOOKS_API_KEY"),
            google_books_base_url: text("GOOGLE_BOOKS_BASE_URL"),
            google_books_batch_size: parsed(&text, "GOOGLE_BOOKS_BATCH_SIZE"),

            open_library_base_url: text("OPEN_LIBRARY_BASE_URL"),
            open_library_covers_base_url: text("OPEN_LIBRARY_COVERS_BASE_URL"),
            open_library_batch_size: parsed(&text, "OPEN_LIBRARY_BATCH_SIZE"),
        }
    }
}

fn parsed<T, F>(text: &F, name: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = text(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring unparsable value");
            None
        }
    }
}
