use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Kind of catalog item. Ids are only meaningful when paired with this.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    #[serde(alias = "book")]
    BookGoogle,
    BookOl,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::BookGoogle => "book_google",
            MediaType::BookOl => "book_ol",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "book_google" | "book" => Ok(MediaType::BookGoogle),
            "book_ol" => Ok(MediaType::BookOl),
            other => Err(format!("unknown media type '{other}'")),
        }
    }
}

/// Upstream catalog that answers a search.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    #[default]
    Tmdb,
    #[serde(alias = "google")]
    GoogleBooks,
    #[serde(alias = "ol")]
    OpenLibrary,
}

impl CatalogSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogSource::Tmdb => "tmdb",
            CatalogSource::GoogleBooks => "google_books",
            CatalogSource::OpenLibrary => "open_library",
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self {
            CatalogSource::Tmdb => MediaType::Movie,
            CatalogSource::GoogleBooks => MediaType::BookGoogle,
            CatalogSource::OpenLibrary => MediaType::BookOl,
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: String,
    pub name: String,
}

impl Genre {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Unified summary of a movie or book, whatever source produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaCard {
    pub id: String,
    pub title: String,
    pub release_date: Option<String>,
    pub poster_url: Option<String>,
    pub rating_out_of_ten: f64,
    pub genres: Vec<Genre>,
    pub overview: String,
    pub media_type: MediaType,
}

/// TMDB sort orders exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovieSort {
    #[serde(rename = "popularity.desc")]
    Popularity,
    #[serde(rename = "vote_average.desc")]
    Rating,
    #[serde(rename = "primary_release_date.desc")]
    ReleaseDate,
    #[serde(rename = "revenue.desc")]
    Revenue,
}

impl MovieSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieSort::Popularity => "popularity.desc",
            MovieSort::Rating => "vote_average.desc",
            MovieSort::ReleaseDate => "primary_release_date.desc",
            MovieSort::Revenue => "revenue.desc",
        }
    }
}

impl FromStr for MovieSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popularity.desc" => Ok(MovieSort::Popularity),
            "vote_average.desc" => Ok(MovieSort::Rating),
            "primary_release_date.desc" => Ok(MovieSort::ReleaseDate),
            "revenue.desc" => Ok(MovieSort::Revenue),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

/// Query-string field where a blank value (`year=`) means absent.
///
/// Browsers send every filter input, filled or not.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn page_or_first<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(empty_as_none(deserializer)?.unwrap_or_else(first_page))
}

fn all_genres() -> String {
    "all".to_string()
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub source: CatalogSource,
    #[serde(default = "all_genres", alias = "genre")]
    pub genre_filter: String,
    #[serde(default = "first_page", deserialize_with = "page_or_first")]
    pub page: u32,
    /// Release year, TMDB only.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub year: Option<u16>,
    /// TMDB only.
    #[serde(default, alias = "sort_by", deserialize_with = "empty_as_none")]
    pub sort_by: Option<MovieSort>,
}

impl SearchRequest {
    pub fn new(source: CatalogSource, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            source,
            genre_filter: all_genres(),
            page: 1,
            year: None,
            sort_by: None,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre_filter = genre.into();
        self
    }

    /// Trimmed, lowercased query with runs of whitespace collapsed.
    pub fn normalized_query(&self) -> String {
        self.query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `None` when no genre filter applies.
    pub fn genre(&self) -> Option<&str> {
        let genre = self.genre_filter.trim();
        if genre.is_empty() || genre.eq_ignore_ascii_case("all") {
            None
        } else {
            Some(genre)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogErrorKind {
    Timeout,
    UpstreamStatus,
    Malformed,
    Network,
    NotConfigured,
}

/// Recoverable upstream failure reported next to an empty result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogError {
    pub kind: CatalogErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub items: Vec<MediaCard>,
    pub page: u32,
    pub has_next: bool,
    pub source: CatalogSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<CatalogError>,
}

impl SearchResponse {
    pub fn empty(source: CatalogSource, page: u32) -> Self {
        Self {
            items: Vec::new(),
            page,
            has_next: false,
            source,
            total_results: None,
            error: None,
        }
    }

    pub fn failed(
        source: CatalogSource,
        page: u32,
        error: CatalogError,
    ) -> Self {
        Self {
            error: Some(error),
            ..Self::empty(source, page)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Length {
    Minutes(u32),
    Pages(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub kind: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    pub id: String,
    pub name: String,
    pub role: Option<String>,
    pub profile_url: Option<String>,
}

/// Full detail page for one catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDetail {
    #[serde(flatten)]
    pub card: MediaCard,
    pub subtitle: Option<String>,
    pub creators: Vec<String>,
    pub all_genres: Vec<Genre>,
    pub backdrop_url: Option<String>,
    pub language: Option<String>,
    pub length: Option<Length>,
    pub rating_count: Option<u64>,
    /// Google Books viewability (`NO_PAGES`, `PARTIAL`, `ALL_PAGES`).
    pub availability: Option<String>,
    pub links: Vec<Link>,
    pub cast: Vec<CastMember>,
    pub trailer: Option<String>,
    pub related: Vec<MediaCard>,
    /// Movies only.
    pub production: Option<ProductionFacts>,
    /// Backdrop stills, largest first as TMDB ranks them.
    pub gallery: Vec<String>,
}

/// Box-office and crew facts shown beside a movie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionFacts {
    pub original_title: Option<String>,
    /// `Released`, `In Production`, `Rumored`...
    pub status: Option<String>,
    /// USD; absent when TMDB reports zero.
    pub budget: Option<u64>,
    pub revenue: Option<u64>,
    pub countries: Vec<String>,
    pub writers: Vec<String>,
    pub producers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    NonBinary,
}

impl Gender {
    /// TMDB codes: 0 unspecified, 1 female, 2 male, 3 non-binary.
    pub fn from_tmdb(code: u8) -> Option<Self> {
        match code {
            1 => Some(Gender::Female),
            2 => Some(Gender::Male),
            3 => Some(Gender::NonBinary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDetail {
    pub id: String,
    pub name: String,
    pub biography: String,
    pub birthday: Option<String>,
    pub deathday: Option<String>,
    pub place_of_birth: Option<String>,
    pub gender: Option<Gender>,
    pub popularity: f64,
    pub profile_url: Option<String>,
    pub also_known_as: Vec<String>,
    pub known_for: Vec<MediaCard>,
    pub gallery: Vec<String>,
    /// IMDb and social profiles.
    pub social_links: Vec<Link>,
}
