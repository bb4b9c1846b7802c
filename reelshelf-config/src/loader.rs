use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::constants::*;
use crate::models::{
    AuthConfig, CatalogConfig, Config, ConfigMetadata, CorsConfig,
    DatabaseConfig, GoogleBooksConfig, OpenLibraryConfig, ServerConfig,
    TmdbConfig,
};
use crate::sources::{EnvConfig, FileConfig};
use crate::validation::{self, ConfigGuardRailError, ConfigWarnings};

const DEFAULT_CONFIG_LOCATIONS: &[&str] =
    &["reelshelf.toml", "config/reelshelf.toml"];

#[derive(Debug, Clone)]
enum EnvSource {
    /// `.env` from the working directory (or a given file), then the process
    /// environment.
    Process { env_file: Option<PathBuf> },
    /// A fixed set of values; nothing is read from the process.
    Fixed(EnvConfig),
}

impl Default for EnvSource {
    fn default() -> Self {
        EnvSource::Process { env_file: None }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env: EnvSource,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// An explicit file must exist.
    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.env = EnvSource::Process {
            env_file: Some(path.into()),
        };
        self
    }

    /// Use `env` instead of the process environment.
    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.env = EnvSource::Fixed(env);
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let (env_config, env_file_loaded) = match &self.env {
            EnvSource::Fixed(env) => (env.clone(), false),
            EnvSource::Process { env_file } => {
                let loaded = load_env_file(env_file.as_ref())?;
                (EnvConfig::gather(), loaded)
            }
        };

        let (file_config, config_path) = self.load_file_config(&env_config)?;

        let (config, warnings) = compose_config(
            file_config,
            env_config,
            ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        )?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let path = if let Some(explicit) = &self.config_path {
            explicit.clone()
        } else if let Some(from_env) = &env_config.config_path {
            from_env.clone()
        } else {
            match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(found) => found,
                None => return Ok((None, None)),
            }
        };

        if !path.exists() {
            return Err(ConfigLoadError::MissingConfig { path });
        }

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        debug!(path = %path.display(), "configuration file loaded");
        Ok((Some(file_config), Some(path)))
    }
}

fn load_env_file(path: Option<&PathBuf>) -> Result<bool, ConfigLoadError> {
    let result = match path {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };
    match result {
        Ok(()) => Ok(true),
        Err(dotenvy::Error::Io(_)) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if metadata.config_path.is_none() {
        warnings.push_with_hint(
            "No reelshelf.toml detected; falling back to environment variables",
            "Create reelshelf.toml or pass --config to use a configuration file",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        cors: file_cors,
        auth: file_auth,
        catalog: file_catalog,
        dev_mode: file_dev_mode,
    } = file_config.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(DEFAULT_PORT),
    };

    let database = DatabaseConfig {
        url: env
            .database_url
            .or(file_database.url)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_else(default_cors_origins),
        allowed_methods: env
            .cors_allowed_methods
            .or(file_cors.allowed_methods)
            .unwrap_or_else(default_cors_methods),
        allowed_headers: env
            .cors_allowed_headers
            .or(file_cors.allowed_headers)
            .unwrap_or_else(default_cors_headers),
    };

    let dev_mode = env.dev_mode.or(file_dev_mode).unwrap_or(false);

    let auth = AuthConfig {
        password_pepper: env
            .auth_password_pepper
            .or(file_auth.password_pepper)
            .unwrap_or_else(|| DEFAULT_PASSWORD_PEPPER.to_string()),
        token_key: env
            .auth_token_key
            .or(file_auth.token_key)
            .unwrap_or_else(|| DEFAULT_TOKEN_KEY.to_string()),
        session_ttl_hours: env
            .session_ttl_hours
            .or(file_auth.session_ttl_hours)
            .unwrap_or(DEFAULT_SESSION_TTL_HOURS),
    };

    let tmdb = file_catalog.tmdb;
    let google = file_catalog.google_books;
    let open_library = file_catalog.open_library;
    let catalog = CatalogConfig {
        page_size: env
            .catalog_page_size
            .or(file_catalog.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE),
        request_timeout_secs: env
            .catalog_request_timeout_secs
            .or(file_catalog.request_timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        cache_ttl_secs: env
            .catalog_cache_ttl_secs
            .or(file_catalog.cache_ttl_secs)
            .unwrap_or(DEFAULT_CACHE_TTL_SECS),
        cache_capacity: env
            .catalog_cache_capacity
            .or(file_catalog.cache_capacity)
            .unwrap_or(DEFAULT_CACHE_CAPACITY),
        max_page: env
            .catalog_max_page
            .or(file_catalog.max_page)
            .unwrap_or(DEFAULT_MAX_PAGE),
        tmdb: TmdbConfig {
            api_key: env
                .tmdb_api_key
                .or(tmdb.api_key.filter(|k| !k.trim().is_empty())),
            base_url: env
                .tmdb_base_url
                .or(tmdb.base_url)
                .unwrap_or_else(|| DEFAULT_TMDB_BASE_URL.to_string()),
            image_base_url: env
                .tmdb_image_base_url
                .or(tmdb.image_base_url)
                .unwrap_or_else(|| DEFAULT_TMDB_IMAGE_BASE_URL.to_string()),
            language: env.tmdb_language.or(tmdb.language),
        },
        google_books: GoogleBooksConfig {
            api_key: env
                .google_books_api_key
                .or(google.api_key.filter(|k| !k.trim().is_empty())),
            base_url: env
                .google_books_base_url
                .or(google.base_url)
                .unwrap_or_else(|| DEFAULT_GOOGLE_BOOKS_BASE_URL.to_string()),
            batch_size: env
                .google_books_batch_size
                .or(google.batch_size)
                .unwrap_or(DEFAULT_BOOK_BATCH_SIZE),
        },
        open_library: OpenLibraryConfig {
            base_url: env
                .open_library_base_url
                .or(open_library.base_url)
                .unwrap_or_else(|| DEFAULT_OPEN_LIBRARY_BASE_URL.to_string()),
            covers_base_url: env
                .open_library_covers_base_url
                .or(open_library.covers_base_url)
                .unwrap_or_else(|| {
                    DEFAULT_OPEN_LIBRARY_COVERS_BASE_URL.to_string()
                }),
            batch_size: env
                .open_library_batch_size
                .or(open_library.batch_size)
                .unwrap_or(DEFAULT_BOOK_BATCH_SIZE),
        },
    };

    let config = Config {
        server,
        database,
        cors,
        auth,
        catalog,
        dev_mode,
        metadata,
    };

    let guard_warnings = validation::apply_guard_rails(&config)?;
    warnings.extend(guard_warnings);

    Ok((config, warnings))
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

fn default_cors_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_cors_headers() -> Vec<String> {
    vec!["Authorization".to_string(), "Content-Type".to_string()]
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
