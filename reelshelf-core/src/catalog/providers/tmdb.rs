use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    BatchRequest, CatalogAdapter, ProviderError, UpstreamBatch,
    deserialize_optional_date, get_json,
};
use crate::catalog::model::{
    CastMember, Gender, Genre, Length, Link, MediaCard, MediaDetail,
    MediaType, MovieSort, PersonDetail, ProductionFacts,
};
use crate::catalog::normalize::{
    CARD_GENRES, NO_MOVIE_OVERVIEW, UNTITLED, non_empty, rating_out_of_ten,
    text_or,
};
use crate::catalog::pagination::{TMDB_MAX_PAGES, TMDB_PAGE_LEN, UpstreamCursor};

pub const TMDB_V3_BASE: &str = "https://api.themoviedb.org/3";
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

const CAST_LIMIT: usize = 12;
const KNOWN_FOR_LIMIT: usize = 20;
const GALLERY_LIMIT: usize = 12;
const BACKDROP_LIMIT: usize = 10;
/// Writers and producers listed per movie.
const CREW_LIMIT: usize = 3;
/// Rating sorts ignore titles with fewer votes than this.
const RATING_SORT_MIN_VOTES: u32 = 200;

/// TMDB's movie genre list, used for card genre names and as the fallback
/// when the live list cannot be fetched.
pub const TMDB_MOVIE_GENRES: &[(u32, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

pub fn fallback_genres() -> Vec<Genre> {
    TMDB_MOVIE_GENRES
        .iter()
        .map(|(id, name)| Genre::new(id.to_string(), *name))
        .collect()
}

fn genre_name(id: u32) -> Option<&'static str> {
    TMDB_MOVIE_GENRES
        .iter()
        .find(|(gid, _)| *gid == id)
        .map(|(_, name)| *name)
}

/// Accept either a numeric TMDB genre id or a genre name.
pub fn resolve_genre_id(genre: &str) -> Option<u32> {
    let genre = genre.trim();
    genre.parse::<u32>().ok().or_else(|| {
        TMDB_MOVIE_GENRES
            .iter()
            .find(|(_, name)| {
                name.eq_ignore_ascii_case(genre)
                    || name.replace(' ', "_").eq_ignore_ascii_case(genre)
            })
            .map(|(id, _)| *id)
    })
}

#[derive(Debug, Deserialize)]
pub struct TmdbPage<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieItem {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<TmdbGenre>,
}

#[derive(Debug, Default, Deserialize)]
struct Credits {
    #[serde(default)]
    cast: Vec<CastCredit>,
    #[serde(default)]
    crew: Vec<CrewCredit>,
}

#[derive(Debug, Deserialize)]
struct CastCredit {
    id: u64,
    name: String,
    #[serde(default)]
    character: Option<String>,
    #[serde(default)]
    profile_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrewCredit {
    name: String,
    #[serde(default)]
    job: Option<String>,
    #[serde(default)]
    department: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductionCountry {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct MovieImages {
    #[serde(default)]
    backdrops: Vec<ImagePath>,
}

#[derive(Debug, Default, Deserialize)]
struct Videos {
    #[serde(default)]
    results: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    key: String,
    #[serde(default)]
    site: String,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Debug, Deserialize)]
pub struct TmdbMovieDetails {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    original_title: Option<String>,
    #[serde(default)]
    tagline: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    budget: Option<u64>,
    #[serde(default)]
    revenue: Option<u64>,
    #[serde(default)]
    production_countries: Vec<ProductionCountry>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    release_date: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    backdrop_path: Option<String>,
    #[serde(default)]
    vote_average: Option<f64>,
    #[serde(default)]
    vote_count: Option<u64>,
    #[serde(default)]
    runtime: Option<u32>,
    #[serde(default)]
    original_language: Option<String>,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    imdb_id: Option<String>,
    #[serde(default)]
    credits: Option<Credits>,
    #[serde(default)]
    videos: Option<Videos>,
    #[serde(default)]
    similar: Option<TmdbPage<TmdbMovieItem>>,
    #[serde(default)]
    images: Option<MovieImages>,
}

#[derive(Debug, Default, Deserialize)]
struct MovieCredits {
    #[serde(default)]
    cast: Vec<TmdbMovieItem>,
}

#[derive(Debug, Default, Deserialize)]
struct PersonImages {
    #[serde(default)]
    profiles: Vec<ImagePath>,
}

#[derive(Debug, Deserialize)]
struct ImagePath {
    file_path: String,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalIds {
    #[serde(default)]
    imdb_id: Option<String>,
    #[serde(default)]
    instagram_id: Option<String>,
    #[serde(default)]
    twitter_id: Option<String>,
    #[serde(default)]
    facebook_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbPerson {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    biography: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    birthday: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    deathday: Option<String>,
    #[serde(default)]
    place_of_birth: Option<String>,
    #[serde(default)]
    gender: Option<u8>,
    #[serde(default)]
    popularity: Option<f64>,
    #[serde(default)]
    profile_path: Option<String>,
    #[serde(default)]
    also_known_as: Vec<String>,
    #[serde(default)]
    movie_credits: Option<MovieCredits>,
    #[serde(default)]
    images: Option<PersonImages>,
    #[serde(default)]
    external_ids: Option<ExternalIds>,
}

#[derive(Debug, Serialize)]
struct SearchMovieQuery<'a> {
    api_key: &'a str,
    query: &'a str,
    page: u32,
    include_adult: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_release_year: Option<u16>,
}

#[derive(Debug, Serialize)]
struct DiscoverMovieQuery<'a> {
    api_key: &'a str,
    sort_by: &'a str,
    include_adult: bool,
    include_video: bool,
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    with_genres: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_release_year: Option<u16>,
    #[serde(
        rename = "vote_count.gte",
        skip_serializing_if = "Option::is_none"
    )]
    vote_count_gte: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DetailQuery<'a> {
    api_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    append_to_response: Option<&'a str>,
    /// Without this, `images` only holds stills tagged with `language`.
    #[serde(skip_serializing_if = "Option::is_none")]
    include_image_language: Option<String>,
}

/// Build an image URL, or `None` for a missing path.
pub fn image_url(base: &str, size: &str, path: Option<&str>) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    Some(format!("{}/{size}{path}", base.trim_end_matches('/')))
}

/// Normalize a TMDB movie list entry.
pub fn movie_card(item: &TmdbMovieItem, image_base: &str) -> MediaCard {
    MediaCard {
        id: item.id.to_string(),
        title: text_or(item.title.as_deref(), UNTITLED),
        release_date: item.release_date.clone(),
        poster_url: image_url(image_base, "w500", item.poster_path.as_deref()),
        rating_out_of_ten: rating_out_of_ten(item.vote_average, 1.0),
        genres: item
            .genre_ids
            .iter()
            .filter_map(|id| genre_name(*id).map(|n| Genre::new(id.to_string(), n)))
            .take(CARD_GENRES)
            .collect(),
        overview: text_or(item.overview.as_deref(), NO_MOVIE_OVERVIEW),
        media_type: MediaType::Movie,
    }
}

/// Normalize a TMDB movie with its appended credits, videos and similar
/// titles.
pub fn movie_detail(raw: &TmdbMovieDetails, image_base: &str) -> MediaDetail {
    let all_genres: Vec<Genre> = raw
        .genres
        .iter()
        .map(|g| Genre::new(g.id.to_string(), g.name.clone()))
        .collect();

    let card = MediaCard {
        id: raw.id.to_string(),
        title: text_or(raw.title.as_deref(), UNTITLED),
        release_date: raw.release_date.clone(),
        poster_url: image_url(image_base, "w500", raw.poster_path.as_deref()),
        rating_out_of_ten: rating_out_of_ten(raw.vote_average, 1.0),
        genres: all_genres.iter().take(CARD_GENRES).cloned().collect(),
        overview: text_or(raw.overview.as_deref(), NO_MOVIE_OVERVIEW),
        media_type: MediaType::Movie,
    };

    let credits = raw.credits.as_ref();
    let crew: &[CrewCredit] = credits.map(|c| c.crew.as_slice()).unwrap_or(&[]);
    let creators =
        crew_names(crew, usize::MAX, |m| m.job.as_deref() == Some("Director"));
    let production = ProductionFacts {
        original_title: non_empty(raw.original_title.as_deref()),
        status: non_empty(raw.status.as_deref()),
        budget: raw.budget.filter(|b| *b > 0),
        revenue: raw.revenue.filter(|r| *r > 0),
        countries: raw
            .production_countries
            .iter()
            .map(|c| c.name.clone())
            .collect(),
        writers: crew_names(crew, CREW_LIMIT, |m| {
            m.department.as_deref() == Some("Writing")
        }),
        producers: crew_names(crew, CREW_LIMIT, |m| {
            m.job.as_deref() == Some("Producer")
        }),
    };
    let gallery = raw
        .images
        .as_ref()
        .map(|images| {
            images
                .backdrops
                .iter()
                .take(BACKDROP_LIMIT)
                .filter_map(|img| {
                    image_url(image_base, "w780", Some(&img.file_path))
                })
                .collect()
        })
        .unwrap_or_default();
    let cast = credits
        .map(|c| {
            c.cast
                .iter()
                .take(CAST_LIMIT)
                .map(|member| CastMember {
                    id: member.id.to_string(),
                    name: member.name.clone(),
                    role: non_empty(member.character.as_deref()),
                    profile_url: image_url(
                        image_base,
                        "w185",
                        member.profile_path.as_deref(),
                    ),
                })
                .collect()
        })
        .unwrap_or_default();

    let trailer = raw.videos.as_ref().and_then(|videos| {
        videos
            .results
            .iter()
            .find(|v| v.site == "YouTube" && v.kind == "Trailer")
            .map(|v| format!("https://www.youtube.com/watch?v={}", v.key))
    });

    let mut links = vec![Link {
        kind: "tmdb".into(),
        url: format!("https://www.themoviedb.org/movie/{}", raw.id),
    }];
    if let Some(homepage) = non_empty(raw.homepage.as_deref()) {
        links.push(Link {
            kind: "homepage".into(),
            url: homepage,
        });
    }
    if let Some(imdb) = non_empty(raw.imdb_id.as_deref()) {
        links.push(Link {
            kind: "imdb".into(),
            url: format!("https://www.imdb.com/title/{imdb}"),
        });
    }

    let related = raw
        .similar
        .as_ref()
        .map(|page| {
            page.results
                .iter()
                .map(|item| movie_card(item, image_base))
                .collect()
        })
        .unwrap_or_default();

    MediaDetail {
        card,
        subtitle: non_empty(raw.tagline.as_deref()),
        creators,
        all_genres,
        backdrop_url: image_url(
            image_base,
            "w1280",
            raw.backdrop_path.as_deref(),
        ),
        language: non_empty(raw.original_language.as_deref()),
        length: raw.runtime.filter(|m| *m > 0).map(Length::Minutes),
        rating_count: raw.vote_count,
        availability: None,
        links,
        cast,
        trailer,
        related,
        production: Some(production),
        gallery,
    }
}

/// Distinct crew names matching `keep`, in credit order.
fn crew_names(
    crew: &[CrewCredit],
    limit: usize,
    keep: impl Fn(&CrewCredit) -> bool,
) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for member in crew.iter().filter(|m| keep(m)) {
        if names.len() == limit {
            break;
        }
        if !names.contains(&member.name) {
            names.push(member.name.clone());
        }
    }
    names
}

fn social_links(ids: &ExternalIds) -> Vec<Link> {
    [
        ("imdb", "https://www.imdb.com/name/", ids.imdb_id.as_deref()),
        ("instagram", "https://instagram.com/", ids.instagram_id.as_deref()),
        ("twitter", "https://twitter.com/", ids.twitter_id.as_deref()),
        ("facebook", "https://facebook.com/", ids.facebook_id.as_deref()),
    ]
    .into_iter()
    .filter_map(|(kind, base, handle)| {
        non_empty(handle).map(|handle| Link {
            kind: kind.to_string(),
            url: format!("{base}{handle}"),
        })
    })
    .collect()
}

pub fn person_detail(raw: &TmdbPerson, image_base: &str) -> PersonDetail {
    let mut credits: Vec<&TmdbMovieItem> = raw
        .movie_credits
        .as_ref()
        .map(|c| c.cast.iter().collect())
        .unwrap_or_default();
    credits.sort_by(|a, b| {
        b.popularity
            .unwrap_or(0.0)
            .total_cmp(&a.popularity.unwrap_or(0.0))
    });

    let mut seen = std::collections::HashSet::new();
    let known_for = credits
        .into_iter()
        .filter(|item| seen.insert(item.id))
        .take(KNOWN_FOR_LIMIT)
        .map(|item| movie_card(item, image_base))
        .collect();

    let gallery = raw
        .images
        .as_ref()
        .map(|images| {
            images
                .profiles
                .iter()
                .take(GALLERY_LIMIT)
                .filter_map(|img| {
                    image_url(image_base, "w500", Some(&img.file_path))
                })
                .collect()
        })
        .unwrap_or_default();

    PersonDetail {
        id: raw.id.to_string(),
        name: text_or(raw.name.as_deref(), "Unknown"),
        biography: raw.biography.clone().unwrap_or_default(),
        birthday: raw.birthday.clone(),
        deathday: raw.deathday.clone(),
        place_of_birth: non_empty(raw.place_of_birth.as_deref()),
        gender: raw.gender.and_then(Gender::from_tmdb),
        popularity: raw.popularity.filter(|p| p.is_finite()).unwrap_or(0.0),
        profile_url: image_url(image_base, "w500", raw.profile_path.as_deref()),
        also_known_as: raw.also_known_as.clone(),
        known_for,
        gallery,
        social_links: raw
            .external_ids
            .as_ref()
            .map(social_links)
            .unwrap_or_default(),
    }
}

/// TMDB v3 movie catalog.
pub struct TmdbAdapter {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    image_base_url: String,
    language: Option<String>,
}

impl fmt::Debug for TmdbAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbAdapter")
            .field("base_url", &self.base_url)
            .field("image_base_url", &self.image_base_url)
            .field("language", &self.language)
            .field("api_key_configured", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl TmdbAdapter {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: TMDB_V3_BASE.to_string(),
            image_base_url: TMDB_IMAGE_BASE.to_string(),
            language: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.trim().is_empty());
        self
    }

    /// Stills in the configured language plus untagged ones.
    fn image_languages(&self) -> Option<String> {
        let language = self.language.as_deref()?;
        let primary = language.split('-').next().unwrap_or(language);
        Some(format!("{primary},null"))
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured("TMDB"))
    }

    /// Live movie genre list.
    pub async fn genres(&self) -> Result<Vec<Genre>, ProviderError> {
        let query = DetailQuery {
            api_key: self.api_key()?,
            language: self.language.as_deref(),
            append_to_response: None,
            include_image_language: None,
        };
        let list: GenreList = get_json(
            &self.http,
            &format!("{}/genre/movie/list", self.base_url),
            &query,
        )
        .await?;

        Ok(list
            .genres
            .into_iter()
            .map(|g| Genre::new(g.id.to_string(), g.name))
            .collect())
    }

    /// Trending movies of the week.
    pub async fn trending(&self) -> Result<Vec<MediaCard>, ProviderError> {
        let query = DetailQuery {
            api_key: self.api_key()?,
            language: self.language.as_deref(),
            append_to_response: None,
            include_image_language: None,
        };
        let page: TmdbPage<TmdbMovieItem> = get_json(
            &self.http,
            &format!("{}/trending/movie/week", self.base_url),
            &query,
        )
        .await?;

        Ok(page
            .results
            .iter()
            .map(|item| movie_card(item, &self.image_base_url))
            .collect())
    }

    pub async fn movie_detail(
        &self,
        id: u64,
    ) -> Result<MediaDetail, ProviderError> {
        let query = DetailQuery {
            api_key: self.api_key()?,
            language: self.language.as_deref(),
            append_to_response: Some("credits,videos,similar,images"),
            include_image_language: self.image_languages(),
        };
        let raw: TmdbMovieDetails = get_json(
            &self.http,
            &format!("{}/movie/{id}", self.base_url),
            &query,
        )
        .await?;

        Ok(movie_detail(&raw, &self.image_base_url))
    }

    pub async fn person_detail(
        &self,
        id: u64,
    ) -> Result<PersonDetail, ProviderError> {
        let query = DetailQuery {
            api_key: self.api_key()?,
            language: self.language.as_deref(),
            append_to_response: Some("movie_credits,images,external_ids"),
            include_image_language: self.image_languages(),
        };
        let raw: TmdbPerson = get_json(
            &self.http,
            &format!("{}/person/{id}", self.base_url),
            &query,
        )
        .await?;

        Ok(person_detail(&raw, &self.image_base_url))
    }

    async fn search_page(
        &self,
        request: &BatchRequest,
        page: u32,
    ) -> Result<TmdbPage<TmdbMovieItem>, ProviderError> {
        let query = SearchMovieQuery {
            api_key: self.api_key()?,
            query: &request.query,
            page,
            include_adult: false,
            language: self.language.as_deref(),
            primary_release_year: request.year,
        };
        get_json(&self.http, &format!("{}/search/movie", self.base_url), &query)
            .await
    }

    async fn discover_page(
        &self,
        request: &BatchRequest,
        genre_id: Option<u32>,
        page: u32,
    ) -> Result<TmdbPage<TmdbMovieItem>, ProviderError> {
        let sort = request.sort.unwrap_or(MovieSort::Popularity);
        let query = DiscoverMovieQuery {
            api_key: self.api_key()?,
            sort_by: sort.as_str(),
            include_adult: false,
            include_video: false,
            page,
            with_genres: genre_id.map(|id| id.to_string()),
            primary_release_year: request.year,
            vote_count_gte: (sort == MovieSort::Rating)
                .then_some(RATING_SORT_MIN_VOTES),
            language: self.language.as_deref(),
        };
        get_json(
            &self.http,
            &format!("{}/discover/movie", self.base_url),
            &query,
        )
        .await
    }
}

#[async_trait]
impl CatalogAdapter for TmdbAdapter {
    fn batch_size(&self) -> u32 {
        TMDB_PAGE_LEN
    }

    fn cursor_for_batch(&self, batch_index: u32) -> UpstreamCursor {
        UpstreamCursor::Page(batch_index.saturating_add(1))
    }

    async fn fetch_batch(
        &self,
        request: &BatchRequest,
        cursor: UpstreamCursor,
    ) -> Result<UpstreamBatch, ProviderError> {
        let page = match cursor {
            UpstreamCursor::Page(page) => page.max(1),
            UpstreamCursor::Offset(offset) => offset / TMDB_PAGE_LEN + 1,
        };

        if u64::from(page) > TMDB_MAX_PAGES {
            return Ok(UpstreamBatch {
                items: Vec::new(),
                raw_len: 0,
                next: None,
                total_results: None,
                exact_total: false,
            });
        }

        let genre_id = request.genre.as_deref().and_then(resolve_genre_id);

        // /search/movie cannot filter by genre, so searches with a genre
        // are filtered locally and lose their authoritative total.
        let (raw, post_filter) = if request.query.is_empty() {
            (self.discover_page(request, genre_id, page).await?, None)
        } else {
            (self.search_page(request, page).await?, genre_id)
        };

        let items = raw
            .results
            .iter()
            .filter(|item| {
                post_filter.is_none_or(|gid| item.genre_ids.contains(&gid))
            })
            .map(|item| movie_card(item, &self.image_base_url))
            .collect();

        let last_page = raw.total_pages.min(TMDB_MAX_PAGES);
        let next = (u64::from(page) < last_page)
            .then(|| UpstreamCursor::Page(page + 1));
        let capped_total = raw
            .total_results
            .min(TMDB_MAX_PAGES * u64::from(TMDB_PAGE_LEN));

        Ok(UpstreamBatch {
            items,
            raw_len: raw.results.len(),
            next,
            total_results: post_filter.is_none().then_some(capped_total),
            exact_total: post_filter.is_none(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "page": 1,
        "total_pages": 3,
        "total_results": 45,
        "results": [
            {
                "id": 603,
                "title": "The Matrix",
                "release_date": "1999-03-30",
                "poster_path": "/matrix.jpg",
                "vote_average": 8.2,
                "genre_ids": [28, 878, 53],
                "overview": "A hacker learns the truth."
            },
            {
                "id": 1,
                "title": "",
                "release_date": "",
                "poster_path": null,
                "vote_average": 11.5,
                "genre_ids": [],
                "overview": null
            }
        ]
    }"#;

    fn fixture() -> TmdbPage<TmdbMovieItem> {
        serde_json::from_str(FIXTURE).unwrap()
    }

    #[test]
    fn normalizes_complete_item() {
        let page = fixture();
        let card = movie_card(&page.results[0], TMDB_IMAGE_BASE);

        assert_eq!(card.id, "603");
        assert_eq!(card.title, "The Matrix");
        assert_eq!(card.release_date.as_deref(), Some("1999-03-30"));
        assert_eq!(
            card.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/matrix.jpg")
        );
        assert_eq!(card.rating_out_of_ten, 8.2);
        assert_eq!(
            card.genres,
            vec![
                Genre::new("28", "Action"),
                Genre::new("878", "Science Fiction")
            ]
        );
        assert_eq!(card.media_type, MediaType::Movie);
    }

    #[test]
    fn substitutes_defaults_for_missing_fields() {
        let page = fixture();
        let card = movie_card(&page.results[1], TMDB_IMAGE_BASE);

        assert_eq!(card.title, UNTITLED);
        assert_eq!(card.release_date, None);
        assert_eq!(card.poster_url, None);
        assert_eq!(card.overview, NO_MOVIE_OVERVIEW);
        assert_eq!(card.rating_out_of_ten, 10.0);
    }

    #[test]
    fn normalization_is_deterministic() {
        let a: Vec<_> = fixture()
            .results
            .iter()
            .map(|i| movie_card(i, TMDB_IMAGE_BASE))
            .collect();
        let b: Vec<_> = fixture()
            .results
            .iter()
            .map(|i| movie_card(i, TMDB_IMAGE_BASE))
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn resolves_genre_ids_and_names() {
        assert_eq!(resolve_genre_id("28"), Some(28));
        assert_eq!(resolve_genre_id("science fiction"), Some(878));
        assert_eq!(resolve_genre_id("Science_Fiction"), Some(878));
        assert_eq!(resolve_genre_id("poetry"), None);
    }

    #[test]
    fn detail_collects_credits_trailer_and_links() {
        let raw: TmdbMovieDetails = serde_json::from_str(
            r#"{
                "id": 603,
                "title": "The Matrix",
                "original_title": "The Matrix",
                "status": "Released",
                "budget": 63000000,
                "revenue": 0,
                "production_countries": [{"iso_3166_1": "US", "name": "United States of America"}],
                "tagline": "Welcome to the Real World.",
                "runtime": 136,
                "vote_count": 25000,
                "vote_average": 8.2,
                "original_language": "en",
                "imdb_id": "tt0133093",
                "genres": [{"id": 28, "name": "Action"}],
                "credits": {
                    "cast": [{"id": 6384, "name": "Keanu Reeves", "character": "Neo", "profile_path": "/k.jpg"}],
                    "crew": [
                        {"name": "Lana Wachowski", "job": "Director", "department": "Directing"},
                        {"name": "Bill Pope", "job": "Director of Photography", "department": "Camera"},
                        {"name": "Lana Wachowski", "job": "Writer", "department": "Writing"},
                        {"name": "Lilly Wachowski", "job": "Writer", "department": "Writing"},
                        {"name": "Lana Wachowski", "job": "Screenplay", "department": "Writing"},
                        {"name": "Joel Silver", "job": "Producer", "department": "Production"},
                        {"name": "Barrie M. Osborne", "job": "Executive Producer", "department": "Production"}
                    ]
                },
                "images": {"backdrops": [{"file_path": "/b1.jpg"}, {"file_path": "/b2.jpg"}]},
                "videos": {"results": [
                    {"key": "teaser", "site": "YouTube", "type": "Teaser"},
                    {"key": "abc", "site": "YouTube", "type": "Trailer"}
                ]},
                "similar": {"results": [{"id": 604, "title": "Reloaded"}]}
            }"#,
        )
        .unwrap();

        let detail = movie_detail(&raw, TMDB_IMAGE_BASE);
        assert_eq!(detail.subtitle.as_deref(), Some("Welcome to the Real World."));
        assert_eq!(detail.creators, vec!["Lana Wachowski"]);
        assert_eq!(detail.length, Some(Length::Minutes(136)));
        assert_eq!(
            detail.trailer.as_deref(),
            Some("https://www.youtube.com/watch?v=abc")
        );
        assert_eq!(detail.cast[0].role.as_deref(), Some("Neo"));
        assert!(detail.links.iter().any(|l| l.kind == "imdb"));
        assert_eq!(detail.related.len(), 1);
        assert_eq!(detail.related[0].overview, NO_MOVIE_OVERVIEW);

        let facts = detail.production.unwrap();
        assert_eq!(facts.status.as_deref(), Some("Released"));
        assert_eq!(facts.budget, Some(63_000_000));
        assert_eq!(facts.revenue, None);
        assert_eq!(facts.countries, vec!["United States of America"]);
        assert_eq!(facts.writers, vec!["Lana Wachowski", "Lilly Wachowski"]);
        assert_eq!(facts.producers, vec!["Joel Silver"]);
        assert_eq!(
            detail.gallery,
            vec![
                "https://image.tmdb.org/t/p/w780/b1.jpg",
                "https://image.tmdb.org/t/p/w780/b2.jpg"
            ]
        );
    }

    #[test]
    fn person_known_for_is_ranked_and_unique() {
        let raw: TmdbPerson = serde_json::from_str(
            r#"{
                "id": 6384,
                "name": "Keanu Reeves",
                "birthday": "1964-09-02",
                "deathday": null,
                "gender": 2,
                "popularity": 41.5,
                "external_ids": {
                    "imdb_id": "nm0000206",
                    "instagram_id": "",
                    "twitter_id": null,
                    "facebook_id": "KeanuReeves"
                },
                "movie_credits": {"cast": [
                    {"id": 1, "title": "Low", "popularity": 1.0},
                    {"id": 2, "title": "High", "popularity": 50.0},
                    {"id": 2, "title": "High", "popularity": 50.0}
                ]},
                "images": {"profiles": [{"file_path": "/a.jpg"}]}
            }"#,
        )
        .unwrap();

        let person = person_detail(&raw, TMDB_IMAGE_BASE);
        let ids: Vec<_> = person.known_for.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(person.gallery, vec!["https://image.tmdb.org/t/p/w500/a.jpg"]);
        assert_eq!(person.deathday, None);
        assert_eq!(person.gender, Some(Gender::Male));
        assert_eq!(person.popularity, 41.5);
        let socials: Vec<_> =
            person.social_links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            socials,
            vec![
                "https://www.imdb.com/name/nm0000206",
                "https://facebook.com/KeanuReeves"
            ]
        );
    }

    #[test]
    fn image_languages_include_untagged_stills() {
        let http = reqwest::Client::new();
        let adapter = TmdbAdapter::new(http.clone(), Some("k".into()))
            .with_language(Some("uk-UA".into()));
        assert_eq!(adapter.image_languages().as_deref(), Some("uk,null"));
        assert_eq!(TmdbAdapter::new(http, None).image_languages(), None);
    }
}
