//! Source-independent normalization helpers shared by every adapter.

use std::collections::HashSet;

use super::model::{Genre, MediaCard};

pub const UNTITLED: &str = "Untitled";
pub const NO_MOVIE_OVERVIEW: &str = "No overview available.";
pub const NO_BOOK_DESCRIPTION: &str = "No description available.";
/// Cards show at most this many genres.
pub const CARD_GENRES: usize = 2;

/// Scale a rating onto 0..=10. Missing and non-finite values become 0.
pub fn rating_out_of_ten(value: Option<f64>, multiplier: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => (v * multiplier).clamp(0.0, 10.0),
        _ => 0.0,
    }
}

/// Trimmed text, or the placeholder when absent or blank.
pub fn text_or(value: Option<&str>, placeholder: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => placeholder.to_string(),
    }
}

/// `None` for absent or blank strings.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Upgrade plain-http image links so browsers do not block mixed content.
pub fn https_url(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}

/// Lowercase slug used as the id of free-text genres.
pub fn slug(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Turn free-text subjects into genres, skipping blanks and repeats.
pub fn genres_from_names<'a>(
    names: impl IntoIterator<Item = &'a str>,
    limit: usize,
) -> Vec<Genre> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(slug(name)))
        .take(limit)
        .map(|name| Genre::new(slug(name), name))
        .collect()
}

/// Drop cards whose id already appeared earlier in the list or in
/// `already_served`. The first occurrence wins.
pub fn dedup_cards(
    cards: Vec<MediaCard>,
    already_served: &HashSet<String>,
) -> Vec<MediaCard> {
    let mut seen = HashSet::with_capacity(cards.len());
    cards
        .into_iter()
        .filter(|card| {
            !already_served.contains(&card.id) && seen.insert(card.id.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::MediaType;

    fn card(id: &str) -> MediaCard {
        MediaCard {
            id: id.to_string(),
            title: id.to_string(),
            release_date: None,
            poster_url: None,
            rating_out_of_ten: 0.0,
            genres: Vec::new(),
            overview: String::new(),
            media_type: MediaType::BookGoogle,
        }
    }

    #[test]
    fn ratings_are_scaled_and_clamped() {
        assert_eq!(rating_out_of_ten(Some(4.5), 2.0), 9.0);
        assert_eq!(rating_out_of_ten(Some(7.3), 1.0), 7.3);
        assert_eq!(rating_out_of_ten(Some(6.0), 2.0), 10.0);
        assert_eq!(rating_out_of_ten(Some(-1.0), 1.0), 0.0);
        assert_eq!(rating_out_of_ten(Some(f64::NAN), 2.0), 0.0);
        assert_eq!(rating_out_of_ten(Some(f64::INFINITY), 1.0), 0.0);
        assert_eq!(rating_out_of_ten(None, 2.0), 0.0);
    }

    #[test]
    fn placeholders_cover_blank_text() {
        assert_eq!(text_or(None, UNTITLED), "Untitled");
        assert_eq!(text_or(Some("   "), UNTITLED), "Untitled");
        assert_eq!(text_or(Some(" Dune "), UNTITLED), "Dune");
        assert_eq!(non_empty(Some("")), None);
    }

    #[test]
    fn http_links_are_upgraded() {
        assert_eq!(
            https_url("http://books.google.com/x?id=1"),
            "https://books.google.com/x?id=1"
        );
        assert_eq!(https_url("https://a/b"), "https://a/b");
    }

    #[test]
    fn genre_names_are_slugged_and_limited() {
        let genres = genres_from_names(
            ["Science Fiction", "science fiction", "", "Fantasy", "Horror"],
            CARD_GENRES,
        );
        assert_eq!(
            genres,
            vec![
                Genre::new("science_fiction", "Science Fiction"),
                Genre::new("fantasy", "Fantasy"),
            ]
        );
    }

    #[test]
    fn dedup_keeps_first_occurrence_and_skips_served_ids() {
        let served: HashSet<String> = ["b".to_string()].into_iter().collect();
        let cards = vec![card("a"), card("b"), card("a"), card("c")];
        let ids: Vec<_> = dedup_cards(cards, &served)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
