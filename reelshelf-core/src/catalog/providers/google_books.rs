use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    BatchRequest, CatalogAdapter, ProviderError, UpstreamBatch,
    deserialize_optional_date, get_json,
};
use crate::catalog::model::{Length, Link, MediaCard, MediaDetail, MediaType};
use crate::catalog::normalize::{
    CARD_GENRES, NO_BOOK_DESCRIPTION, UNTITLED, genres_from_names, https_url,
    non_empty, rating_out_of_ten, text_or,
};
use crate::catalog::pagination::UpstreamCursor;

pub const GOOGLE_BOOKS_BASE: &str = "https://www.googleapis.com/books/v1";
/// Largest `maxResults` the volumes endpoint accepts.
pub const GOOGLE_MAX_BATCH: u32 = 40;
/// Subject searched when neither a query nor a genre is given.
const DEFAULT_SUBJECT: &str = "fiction";

#[derive(Debug, Deserialize)]
pub struct VolumesPage {
    #[serde(rename = "totalItems", default)]
    pub total_items: u64,
    #[serde(default)]
    pub items: Vec<Volume>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: String,
    #[serde(default)]
    pub volume_info: VolumeInfo,
    #[serde(default)]
    pub access_info: Option<AccessInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub published_date: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<u64>,
    pub page_count: Option<u32>,
    pub language: Option<String>,
    pub image_links: Option<ImageLinks>,
    pub preview_link: Option<String>,
    pub info_link: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
    pub small: Option<String>,
    pub medium: Option<String>,
    pub large: Option<String>,
    pub extra_large: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessInfo {
    pub viewability: Option<String>,
    pub web_reader_link: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VolumesQuery<'a> {
    q: &'a str,
    start_index: u32,
    max_results: u32,
    print_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct KeyQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
}

/// Compose the `q` parameter: free text plus an optional `subject:` term.
pub fn build_query(query: &str, genre: Option<&str>) -> String {
    let subject = genre.map(|g| {
        let g = g.replace('_', " ");
        if g.contains(' ') {
            format!("subject:\"{g}\"")
        } else {
            format!("subject:{g}")
        }
    });

    match (query.trim(), subject) {
        ("", None) => format!("subject:{DEFAULT_SUBJECT}"),
        ("", Some(subject)) => subject,
        (q, None) => q.to_string(),
        (q, Some(subject)) => format!("{q} {subject}"),
    }
}

/// Google categories look like "Fiction / Science Fiction / General".
fn category_names(categories: &[String]) -> impl Iterator<Item = &str> {
    categories
        .iter()
        .flat_map(|c| c.split('/'))
        .map(str::trim)
        .filter(|c| !c.eq_ignore_ascii_case("general"))
}

fn thumbnail(info: &VolumeInfo) -> Option<String> {
    let links = info.image_links.as_ref()?;
    links
        .thumbnail
        .as_deref()
        .or(links.small_thumbnail.as_deref())
        .and_then(|url| non_empty(Some(url)))
        .map(|url| https_url(&url))
}

fn full_cover(info: &VolumeInfo) -> Option<String> {
    let links = info.image_links.as_ref()?;
    [
        &links.extra_large,
        &links.large,
        &links.medium,
        &links.small,
        &links.thumbnail,
        &links.small_thumbnail,
    ]
    .into_iter()
    .find_map(|url| non_empty(url.as_deref()))
    .map(|url| https_url(&url))
}

/// Normalize a Google Books volume list entry.
pub fn volume_card(volume: &Volume) -> MediaCard {
    let info = &volume.volume_info;
    MediaCard {
        id: volume.id.clone(),
        title: text_or(info.title.as_deref(), UNTITLED),
        release_date: info.published_date.clone(),
        poster_url: thumbnail(info),
        rating_out_of_ten: rating_out_of_ten(info.average_rating, 2.0),
        genres: genres_from_names(category_names(&info.categories), CARD_GENRES),
        overview: text_or(info.description.as_deref(), NO_BOOK_DESCRIPTION),
        media_type: MediaType::BookGoogle,
    }
}

pub fn volume_detail(volume: &Volume) -> MediaDetail {
    let info = &volume.volume_info;
    let mut card = volume_card(volume);
    card.poster_url = full_cover(info).or(card.poster_url);

    let access = volume.access_info.clone().unwrap_or_default();
    let links = [
        ("preview", info.preview_link.as_deref()),
        ("reader", access.web_reader_link.as_deref()),
        ("info", info.info_link.as_deref()),
    ]
    .into_iter()
    .filter_map(|(kind, url)| {
        non_empty(url).map(|url| Link {
            kind: kind.to_string(),
            url: https_url(&url),
        })
    })
    .collect();

    MediaDetail {
        subtitle: non_empty(info.subtitle.as_deref()),
        creators: info.authors.clone(),
        all_genres: genres_from_names(category_names(&info.categories), usize::MAX),
        backdrop_url: None,
        language: non_empty(info.language.as_deref()),
        length: info.page_count.filter(|p| *p > 0).map(Length::Pages),
        rating_count: info.ratings_count,
        availability: Some(
            non_empty(access.viewability.as_deref())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
        ),
        links,
        cast: Vec::new(),
        trailer: None,
        related: Vec::new(),
        production: None,
        gallery: Vec::new(),
        card,
    }
}

/// Google ids are short opaque tokens; anything else cannot exist upstream.
fn valid_volume_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Google Books volumes search.
pub struct GoogleBooksAdapter {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    batch_size: u32,
}

impl fmt::Debug for GoogleBooksAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleBooksAdapter")
            .field("base_url", &self.base_url)
            .field("batch_size", &self.batch_size)
            .field("api_key_configured", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl GoogleBooksAdapter {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: GOOGLE_BOOKS_BASE.to_string(),
            batch_size: GOOGLE_MAX_BATCH,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.clamp(1, GOOGLE_MAX_BATCH);
        self
    }

    pub async fn volume_detail(
        &self,
        id: &str,
    ) -> Result<MediaDetail, ProviderError> {
        if !valid_volume_id(id) {
            return Err(ProviderError::NotFound);
        }

        let query = KeyQuery {
            key: self.api_key.as_deref(),
        };
        let volume: Volume = get_json(
            &self.http,
            &format!("{}/volumes/{id}", self.base_url),
            &query,
        )
        .await?;

        Ok(volume_detail(&volume))
    }
}

#[async_trait]
impl CatalogAdapter for GoogleBooksAdapter {
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

        let q = build_query(&request.query, request.genre.as_deref());
        let query = VolumesQuery {
            q: &q,
            start_index: offset,
            max_results: self.batch_size,
            print_type: "books",
            key: self.api_key.as_deref(),
        };
        let page: VolumesPage = get_json(
            &self.http,
            &format!("{}/volumes", self.base_url),
            &query,
        )
        .await?;

        let raw_len = page.items.len();
        // totalItems drifts between calls, so it only bounds the cursor.
        let more = raw_len >= self.batch_size as usize
            && u64::from(offset) + (raw_len as u64) < page.total_items;

        Ok(UpstreamBatch {
            items: page.items.iter().map(volume_card).collect(),
            raw_len,
            next: more
                .then(|| UpstreamCursor::Offset(offset + self.batch_size)),
            total_results: Some(page.total_items),
            exact_total: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "kind": "books#volumes",
        "totalItems": 2,
        "items": [
            {
                "id": "zyTCAlFPjgYC",
                "volumeInfo": {
                    "title": "The Google Story",
                    "authors": ["David A. Vise", "Mark Malseed"],
                    "publishedDate": "2005-11-15",
                    "description": "Inside the company.",
                    "categories": ["Business & Economics / General", "History"],
                    "averageRating": 3.5,
                    "ratingsCount": 136,
                    "pageCount": 207,
                    "language": "en",
                    "imageLinks": {
                        "smallThumbnail": "http://books.google.com/s.jpg",
                        "thumbnail": "http://books.google.com/t.jpg",
                        "large": "http://books.google.com/l.jpg"
                    },
                    "previewLink": "http://books.google.com/preview"
                },
                "accessInfo": {"viewability": "PARTIAL", "webReaderLink": "http://play.google.com/r"}
            },
            {
                "id": "bare",
                "volumeInfo": {"averageRating": 5}
            }
        ]
    }"#;

    fn fixture() -> VolumesPage {
        serde_json::from_str(FIXTURE).unwrap()
    }

    #[test]
    fn normalizes_volume_card() {
        let page = fixture();
        let card = volume_card(&page.items[0]);

        assert_eq!(card.id, "zyTCAlFPjgYC");
        assert_eq!(card.rating_out_of_ten, 7.0);
        assert_eq!(
            card.poster_url.as_deref(),
            Some("https://books.google.com/t.jpg")
        );
        let genre_names: Vec<_> =
            card.genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(genre_names, vec!["Business & Economics", "History"]);
        assert_eq!(card.media_type, MediaType::BookGoogle);
    }

    #[test]
    fn sparse_volume_gets_placeholders() {
        let page = fixture();
        let card = volume_card(&page.items[1]);

        assert_eq!(card.title, UNTITLED);
        assert_eq!(card.overview, NO_BOOK_DESCRIPTION);
        assert_eq!(card.poster_url, None);
        assert_eq!(card.release_date, None);
        assert_eq!(card.rating_out_of_ten, 10.0);
    }

    #[test]
    fn detail_prefers_large_cover_and_reports_viewability() {
        let page = fixture();
        let detail = volume_detail(&page.items[0]);

        assert_eq!(
            detail.card.poster_url.as_deref(),
            Some("https://books.google.com/l.jpg")
        );
        assert_eq!(detail.availability.as_deref(), Some("PARTIAL"));
        assert_eq!(detail.length, Some(Length::Pages(207)));
        assert_eq!(detail.creators.len(), 2);
        assert_eq!(detail.links.len(), 2);

        let bare = volume_detail(&page.items[1]);
        assert_eq!(bare.availability.as_deref(), Some("UNKNOWN"));
    }

    #[test]
    fn query_includes_subject_terms() {
        assert_eq!(build_query("", None), "subject:fiction");
        assert_eq!(build_query("dune", None), "dune");
        assert_eq!(build_query("dune", Some("fantasy")), "dune subject:fantasy");
        assert_eq!(
            build_query("", Some("science_fiction")),
            "subject:\"science fiction\""
        );
    }

    #[test]
    fn rejects_suspicious_ids() {
        assert!(valid_volume_id("zyTCAlFPjgYC"));
        assert!(!valid_volume_id("../etc"));
        assert!(!valid_volume_id(""));
    }
}
