use axum::http::{Method, header::HeaderName};
use thiserror::Error;

use crate::constants::{GOOGLE_BOOKS_MAX_BATCH, TMDB_BATCH_SIZE};
use crate::models::{AuthConfig, CatalogConfig, Config, CorsConfig};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("authentication secret {field} {reason}")]
    WeakSecret { field: &'static str, reason: String },
    #[error("CORS wildcard origins are not allowed when DEV_MODE is false")]
    DangerousCorsWildcard,
    #[error("invalid CORS configuration: {reason}")]
    InvalidCorsConfig { reason: String },
    #[error("invalid catalog configuration: {reason}")]
    InvalidCatalogConfig { reason: String },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if config.dev_mode {
        if config.auth.is_default_pepper() || config.auth.is_default_token_key()
        {
            warnings.push_with_hint(
                "Using built-in development auth secrets",
                "Set AUTH_PASSWORD_PEPPER and AUTH_TOKEN_KEY before deploying",
            );
        }
    } else {
        enforce_secret(&config.auth)?;
        if config.cors.is_wildcard_included() {
            return Err(ConfigGuardRailError::DangerousCorsWildcard);
        }
    }

    validate_cors(&config.cors)?;
    validate_catalog(&config.catalog)?;

    if config.catalog.tmdb.api_key.is_none() {
        warnings.push_with_hint(
            "TMDB_API_KEY not configured; movie endpoints will report not_configured",
            "Request a v3 API key at themoviedb.org and set TMDB_API_KEY",
        );
    }

    if config.auth.session_ttl_hours == 0 {
        warnings.push(
            "SESSION_TTL_HOURS is 0; every issued session expires immediately",
        );
    }

    Ok(warnings)
}

fn enforce_secret(auth: &AuthConfig) -> Result<(), ConfigGuardRailError> {
    const MIN_SECRET_LENGTH: usize = 32;

    if auth.is_default_pepper() {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_PASSWORD_PEPPER",
            reason: "uses the default placeholder value".into(),
        });
    }

    if auth.password_pepper.len() < MIN_SECRET_LENGTH {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_PASSWORD_PEPPER",
            reason: format!("must be at least {MIN_SECRET_LENGTH} characters"),
        });
    }

    if auth.is_default_token_key() {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_TOKEN_KEY",
            reason: "uses the default placeholder value".into(),
        });
    }

    if auth.token_key.len() < MIN_SECRET_LENGTH {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_TOKEN_KEY",
            reason: format!("must be at least {MIN_SECRET_LENGTH} characters"),
        });
    }

    Ok(())
}

fn validate_catalog(
    catalog: &CatalogConfig,
) -> Result<(), ConfigGuardRailError> {
    let invalid = |reason: String| {
        Err(ConfigGuardRailError::InvalidCatalogConfig { reason })
    };

    if catalog.page_size == 0 {
        return invalid("page_size must be greater than zero".into());
    }
    if catalog.max_page == 0 {
        return invalid("max_page must be greater than zero".into());
    }
    if catalog.google_books.batch_size > GOOGLE_BOOKS_MAX_BATCH {
        return invalid(format!(
            "google_books.batch_size may not exceed {GOOGLE_BOOKS_MAX_BATCH}"
        ));
    }

    for (name, batch) in [
        ("tmdb", TMDB_BATCH_SIZE),
        ("google_books", catalog.google_books.batch_size),
        ("open_library", catalog.open_library.batch_size),
    ] {
        if batch == 0 || batch % catalog.page_size != 0 {
            return invalid(format!(
                "page_size {} must divide the {name} batch size {batch}",
                catalog.page_size
            ));
        }
    }

    if catalog.request_timeout_secs == 0 {
        return invalid("request_timeout_secs must be greater than zero".into());
    }

    for (name, raw) in [
        ("tmdb.base_url", &catalog.tmdb.base_url),
        ("tmdb.image_base_url", &catalog.tmdb.image_base_url),
        ("google_books.base_url", &catalog.google_books.base_url),
        ("open_library.base_url", &catalog.open_library.base_url),
        ("open_library.covers_base_url", &catalog.open_library.covers_base_url),
    ] {
        match url::Url::parse(raw) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => {
                return invalid(format!("{name} `{raw}` is not an http(s) URL"));
            }
        }
    }

    Ok(())
}

fn validate_cors(cors: &CorsConfig) -> Result<(), ConfigGuardRailError> {
    if cors.allowed_methods.is_empty() {
        return Err(ConfigGuardRailError::InvalidCorsConfig {
            reason:
                "CORS_ALLOWED_METHODS must include at least one HTTP method"
                    .into(),
        });
    }

    for method in &cors.allowed_methods {
        Method::from_bytes(method.as_bytes()).map_err(|_| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!(
                    "invalid HTTP method `{}` in CORS_ALLOWED_METHODS",
                    method
                ),
            }
        })?;
    }

    for header in &cors.allowed_headers {
        HeaderName::from_bytes(header.as_bytes()).map_err(|_| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!(
                    "invalid header name `{}` in CORS_ALLOWED_HEADERS",
                    header
                ),
            }
        })?;
    }

    Ok(())
}
