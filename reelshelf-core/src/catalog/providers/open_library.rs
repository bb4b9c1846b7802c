use std::fmt;

use async_trait::async_trait;
use futures::future::{join, join_all};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{
    BatchRequest, CatalogAdapter, ProviderError, UpstreamBatch,
    NO_QUERY, deserialize_text_value, get_json,
};
use crate::catalog::model::{Link, MediaCard, MediaDetail, MediaType};
use crate::catalog::normalize::{
    CARD_GENRES, NO_BOOK_DESCRIPTION, UNTITLED, genres_from_names, non_empty,
    rating_out_of_ten, text_or,
};
use crate::catalog::pagination::UpstreamCursor;

pub const OPEN_LIBRARY_BASE: &str = "https://openlibrary.org";
pub const OPEN_LIBRARY_COVERS_BASE: &str = "https://covers.openlibrary.org";
pub const OPEN_LIBRARY_BATCH: u32 = 40;
const DEFAULT_SUBJECT: &str = "fiction";
const SEARCH_FIELDS: &str =
    "key,title,first_publish_year,cover_i,ratings_average,subject";
const AUTHOR_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(rename = "numFound", alias = "num_found", default)]
    pub num_found: u64,
    #[serde(default)]
    pub docs: Vec<SearchDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchDoc {
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub first_publish_year: Option<i32>,
    #[serde(default)]
    pub cover_i: Option<i64>,
    #[serde(default)]
    pub ratings_average: Option<f64>,
    #[serde(default)]
    pub subject: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Work {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text_value")]
    description: Option<String>,
    #[serde(default)]
    subjects: Vec<String>,
    #[serde(default)]
    covers: Vec<i64>,
    #[serde(default)]
    first_publish_date: Option<String>,
    #[serde(default)]
    authors: Vec<WorkAuthor>,
    #[serde(default)]
    links: Vec<WorkLink>,
}

#[derive(Debug, Deserialize)]
struct WorkAuthor {
    author: KeyRef,
}

#[derive(Debug, Deserialize)]
struct KeyRef {
    key: String,
}

#[derive(Debug, Deserialize)]
struct WorkLink {
    #[serde(default)]
    title: Option<String>,
    url: String,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Ratings {
    #[serde(default)]
    summary: RatingSummary,
}

#[derive(Debug, Default, Deserialize)]
struct RatingSummary {
    #[serde(default)]
    average: Option<f64>,
    #[serde(default)]
    count: Option<u64>,
}

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    q: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    offset: u32,
    limit: u32,
    fields: &'a str,
}

/// "/works/OL45804W" becomes "OL45804W".
pub fn work_id(key: &str) -> String {
    key.trim_start_matches("/works/").to_string()
}

fn cover_url(
    covers_base: &str,
    cover_id: Option<i64>,
    size: &str,
) -> Option<String> {
    let id = cover_id.filter(|id| *id > 0)?;
    Some(format!(
        "{}/b/id/{id}-{size}.jpg",
        covers_base.trim_end_matches('/')
    ))
}

/// Normalize an Open Library search document.
pub fn search_card(doc: &SearchDoc, covers_base: &str) -> MediaCard {
    MediaCard {
        id: work_id(&doc.key),
        title: text_or(doc.title.as_deref(), UNTITLED),
        release_date: doc.first_publish_year.map(|y| y.to_string()),
        poster_url: cover_url(covers_base, doc.cover_i, "L"),
        rating_out_of_ten: rating_out_of_ten(doc.ratings_average, 2.0),
        genres: genres_from_names(
            doc.subject.iter().map(String::as_str),
            CARD_GENRES,
        ),
        overview: NO_BOOK_DESCRIPTION.to_string(),
        media_type: MediaType::BookOl,
    }
}

/// Combine a work with its separately fetched authors and ratings.
pub fn work_detail(
    id: &str,
    work: &Work,
    authors: Vec<String>,
    ratings: &Ratings,
    covers_base: &str,
) -> MediaDetail {
    let all_genres = genres_from_names(
        work.subjects.iter().map(String::as_str),
        usize::MAX,
    );

    let card = MediaCard {
        id: id.to_string(),
        title: text_or(work.title.as_deref(), UNTITLED),
        release_date: non_empty(work.first_publish_date.as_deref()),
        poster_url: cover_url(covers_base, work.covers.first().copied(), "L"),
        rating_out_of_ten: rating_out_of_ten(ratings.summary.average, 2.0),
        genres: all_genres.iter().take(CARD_GENRES).cloned().collect(),
        overview: text_or(work.description.as_deref(), NO_BOOK_DESCRIPTION),
        media_type: MediaType::BookOl,
    };

    // Readers follow this link, so it names the public site even when the
    // API base points at a mirror.
    let mut links = vec![Link {
        kind: "openlibrary".into(),
        url: format!("{OPEN_LIBRARY_BASE}/works/{id}"),
    }];
    links.extend(work.links.iter().map(|link| Link {
        kind: non_empty(link.title.as_deref())
            .unwrap_or_else(|| "link".to_string()),
        url: link.url.clone(),
    }));

    MediaDetail {
        card,
        subtitle: non_empty(work.subtitle.as_deref()),
        creators: authors,
        all_genres,
        backdrop_url: None,
        language: None,
        length: None,
        rating_count: ratings.summary.count,
        availability: None,
        links,
        cast: Vec::new(),
        trailer: None,
        related: Vec::new(),
        production: None,
        gallery: Vec::new(),
    }
}

fn valid_key_segment(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Open Library search and works API.
pub struct OpenLibraryAdapter {
    http: reqwest::Client,
    base_url: String,
    covers_base_url: String,
    batch_size: u32,
}

impl fmt::Debug for OpenLibraryAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenLibraryAdapter")
            .field("base_url", &self.base_url)
            .field("covers_base_url", &self.covers_base_url)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl OpenLibraryAdapter {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: OPEN_LIBRARY_BASE.to_string(),
            covers_base_url: OPEN_LIBRARY_COVERS_BASE.to_string(),
            batch_size: OPEN_LIBRARY_BATCH,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_covers_base_url(mut self, url: impl Into<String>) -> Self {
        self.covers_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    async fn author_name(&self, key: &str) -> Option<String> {
        let url = format!("{}{key}.json", self.base_url);
        match get_json::<_, Author>(&self.http, &url, NO_QUERY).await {
            Ok(author) => non_empty(author.name.as_deref()),
            Err(err) => {
                warn!(
                    author = key,
                    error = %err,
                    "open library author lookup failed"
                );
                None
            }
        }
    }

    async fn ratings(&self, id: &str) -> Ratings {
        let url = format!("{}/works/{id}/ratings.json", self.base_url);
        get_json::<_, Ratings>(&self.http, &url, NO_QUERY)
            .await
            .unwrap_or_else(|err| {
                warn!(
                    work = id,
                    error = %err,
                    "open library ratings lookup failed"
                );
                Ratings::default()
            })
    }

    /// Fetch a work; its authors and ratings are resolved concurrently and
    /// degrade to empty when they fail.
    pub async fn work_detail(
        &self,
        id: &str,
    ) -> Result<MediaDetail, ProviderError> {
        if !valid_key_segment(id) {
            return Err(ProviderError::NotFound);
        }

        let work: Work = get_json(
            &self.http,
            &format!("{}/works/{id}.json", self.base_url),
            NO_QUERY,
        )
        .await?;

        let author_lookups = work
            .authors
            .iter()
            .take(AUTHOR_LIMIT)
            .map(|a| self.author_name(&a.author.key));
        let (authors, ratings) =
            join(join_all(author_lookups), self.ratings(id)).await;

        Ok(work_detail(
            id,
            &work,
            authors.into_iter().flatten().collect(),
            &ratings,
            &self.covers_base_url,
        ))
    }
}

#[async_trait]
impl CatalogAdapter for OpenLibraryAdapter {
    fn batch_size(&self) -> u32 {
        self.batch_size
    }

    fn cursor_for_batch(&self, batch_index: u32) -> UpstreamCursor {
        UpstreamCursor::Offset(batch_index.saturating_mul(self.batch_size))
    }

    async fn fetch_batch(
        &self,
        request: &BatchRequest,
        cursor: UpstreamCursor,
    ) -> Result<UpstreamBatch, ProviderError> {
        let offset = match cursor {
            UpstreamCursor::Offset(offset) => offset,
            UpstreamCursor::Page(page) => {
                page.saturating_sub(1).saturating_mul(self.batch_size)
            }
        };

        let q = Some(request.query.trim()).filter(|q| !q.is_empty());
        let subject = match (q, request.genre.as_deref()) {
            (_, Some(genre)) => Some(genre),
            (None, None) => Some(DEFAULT_SUBJECT),
            (Some(_), None) => None,
        };
        let query = SearchQuery {
            q,
            subject,
            offset,
            limit: self.batch_size,
            fields: SEARCH_FIELDS,
        };

        let page: SearchPage = get_json(
            &self.http,
            &format!("{}/search.json", self.base_url),
            &query,
        )
        .await?;

        let raw_len = page.docs.len();
        let more = raw_len >= self.batch_size as usize
            && u64::from(offset) + (raw_len as u64) < page.num_found;

        Ok(UpstreamBatch {
            items: page
                .docs
                .iter()
                .map(|doc| search_card(doc, &self.covers_base_url))
                .collect(),
            raw_len,
            next: more
                .then(|| UpstreamCursor::Offset(offset + self.batch_size)),
            total_results: Some(page.num_found),
            exact_total: false,
        })
    }
}
