pub mod google_books;
pub mod open_library;
pub mod tmdb;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::model::{CatalogError, CatalogErrorKind, MediaCard, MovieSort};
use super::pagination::UpstreamCursor;

pub use google_books::GoogleBooksAdapter;
pub use open_library::OpenLibraryAdapter;
pub use tmdb::TmdbAdapter;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("upstream returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Not found")]
    NotFound,

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("upstream request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::ParseError(err.to_string())
        } else {
            ProviderError::NetworkError(err)
        }
    }
}

impl ProviderError {
    pub fn kind(&self) -> CatalogErrorKind {
        match self {
            ProviderError::Status { .. }
            | ProviderError::NotFound
            | ProviderError::RateLimited
            | ProviderError::InvalidApiKey => CatalogErrorKind::UpstreamStatus,
            ProviderError::Timeout => CatalogErrorKind::Timeout,
            ProviderError::NetworkError(_) => CatalogErrorKind::Network,
            ProviderError::ParseError(_) => CatalogErrorKind::Malformed,
            ProviderError::NotConfigured(_) => CatalogErrorKind::NotConfigured,
        }
    }

    pub fn to_catalog_error(&self) -> CatalogError {
        CatalogError {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Everything an adapter needs to fetch one upstream batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// Normalized query; may be empty.
    pub query: String,
    pub genre: Option<String>,
    pub year: Option<u16>,
    pub sort: Option<MovieSort>,
}

/// One upstream page, already normalized to cards.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamBatch {
    pub items: Vec<MediaCard>,
    /// Number of raw items the upstream returned, before filtering.
    pub raw_len: usize,
    pub next: Option<UpstreamCursor>,
    pub total_results: Option<u64>,
    /// Whether `total_results` can drive `hasNext` directly.
    pub exact_total: bool,
}

/// A catalog backend that can be paged through in fixed-size batches.
#[async_trait]
pub trait CatalogAdapter: Send + Sync {
    /// Raw items requested per upstream call.
    fn batch_size(&self) -> u32;

    fn cursor_for_batch(&self, batch_index: u32) -> UpstreamCursor;

    async fn fetch_batch(
        &self,
        request: &BatchRequest,
        cursor: UpstreamCursor,
    ) -> Result<UpstreamBatch, ProviderError>;
}

/// Build the shared HTTP client used by every adapter.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("reelshelf/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ProviderError::NetworkError)
}

/// Empty query string for endpoints addressed purely by path.
pub(crate) const NO_QUERY: &[(&str, &str)] = &[];

/// GET a JSON document and map failures onto [`ProviderError`].
pub(crate) async fn get_json<Q, T>(
    http: &reqwest::Client,
    url: &str,
    query: &Q,
) -> Result<T, ProviderError>
where
    Q: Serialize + ?Sized,
    T: DeserializeOwned,
{
    debug!(url, "upstream request");
    let response = http.get(url).query(query).send().await?;

    let status = response.status();
    if status.is_success() {
        let body = response.bytes().await?;
        return serde_json::from_slice::<T>(&body)
            .map_err(|err| ProviderError::ParseError(err.to_string()));
    }

    // TMDB reports `status_message`, Google `error.message`.
    #[derive(Debug, Deserialize)]
    struct NestedError {
        #[serde(default)]
        message: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        status_message: Option<String>,
        #[serde(default)]
        error: Option<NestedError>,
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| {
            body.status_message
                .or_else(|| body.error.and_then(|e| e.message))
        })
        .unwrap_or_else(|| format!("request failed with status {}", status));

    match status.as_u16() {
        401 => Err(ProviderError::InvalidApiKey),
        404 => Err(ProviderError::NotFound),
        429 => Err(ProviderError::RateLimited),
        code => Err(ProviderError::Status {
            status: code,
            message,
        }),
    }
}

/// Accept a string, a `{ "value": .. }` object, or nothing.
pub(crate) fn deserialize_text_value<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextValue {
        Plain(String),
        Wrapped { value: String },
        Other(serde_json::Value),
    }

    Ok(match Option::<TextValue>::deserialize(deserializer)? {
        Some(TextValue::Plain(s)) | Some(TextValue::Wrapped { value: s }) => {
            Some(s)
        }
        Some(TextValue::Other(_)) | None => None,
    })
}

/// Treat empty date strings as absent.
pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
