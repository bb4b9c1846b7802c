use std::collections::HashSet;
use std::time::Duration;

use reelshelf_core::catalog::providers::http_client;
use reelshelf_core::catalog::{
    CatalogErrorKind, CatalogService, CatalogSettings, CatalogSource,
    GoogleBooksAdapter, MediaType, MovieSort, OpenLibraryAdapter,
    ProviderError, SearchRequest, TmdbAdapter,
};
use serde_json::{Value, json};
use wiremock::matchers::{
    method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn service_for(server: &MockServer, settings: CatalogSettings) -> CatalogService {
    service_with_timeout(server, settings, Duration::from_secs(5))
}

fn service_with_timeout(
    server: &MockServer,
    settings: CatalogSettings,
    timeout: Duration,
) -> CatalogService {
    let http = http_client(timeout).unwrap();
    CatalogService::new(
        TmdbAdapter::new(http.clone(), Some("test-key".into()))
            .with_base_url(server.uri())
            .with_image_base_url("https://img.test"),
        GoogleBooksAdapter::new(http.clone(), None)
            .with_base_url(server.uri()),
        OpenLibraryAdapter::new(http)
            .with_base_url(server.uri())
            .with_covers_base_url("https://covers.test"),
        settings,
    )
}

fn volumes(ids: impl Iterator<Item = u32>, total: u64) -> Value {
    let items: Vec<Value> = ids
        .map(|i| {
            json!({
                "id": format!("vol{i}"),
                "volumeInfo": {
                    "title": format!("Volume {i}"),
                    "averageRating": 4.5,
                    "categories": ["Fiction / Fantasy"]
                }
            })
        })
        .collect();
    json!({ "totalItems": total, "items": items })
}

fn ol_docs(ids: impl Iterator<Item = u32>, num_found: u64) -> Value {
    let docs: Vec<Value> = ids
        .map(|i| {
            json!({
                "key": format!("/works/OL{i}W"),
                "title": format!("Work {i}"),
                "ratings_average": 9.0
            })
        })
        .collect();
    json!({ "numFound": num_found, "docs": docs })
}

fn tmdb_page(ids: impl Iterator<Item = u64>, page: u32, total: u64) -> Value {
    let results: Vec<Value> = ids
        .map(|id| {
            json!({
                "id": id,
                "title": format!("Movie {id}"),
                "vote_average": -3.0,
                "genre_ids": [28]
            })
        })
        .collect();
    json!({
        "page": page,
        "results": results,
        "total_results": total,
        "total_pages": total.div_ceil(20)
    })
}

/// Serves endless full Open Library batches whose windows overlap the
/// previous batch by a few items, the way live listings drift.
struct DriftingPager {
    overlap: u32,
}

impl Respond for DriftingPager {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let offset: u32 = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "offset")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);
        let start = offset.saturating_sub(self.overlap);
        ResponseTemplate::new(200)
            .set_body_json(ol_docs(start..start + 40, 1_000_000))
    }
}

#[tokio::test]
async fn two_client_pages_share_one_google_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .and(query_param("startIndex", "0"))
        .and(query_param("maxResults", "40"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(volumes(0..40, 200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let catalog = service_for(&server, CatalogSettings::default());
    let request = SearchRequest::new(CatalogSource::GoogleBooks, "dune");

    let first = catalog.search(&request).await;
    let second = catalog.search(&request.clone().with_page(2)).await;

    assert_eq!(first.items.len(), 20);
    assert_eq!(second.items.len(), 20);
    assert_eq!(first.items[0].id, "vol0");
    assert_eq!(second.items[0].id, "vol20");
    assert!(first.has_next);
    assert!(second.has_next);
    assert!(first.error.is_none());
    assert!(
        first
            .items
            .iter()
            .all(|c| c.media_type == MediaType::BookGoogle)
    );
}

#[tokio::test]
async fn tmdb_has_next_follows_total_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(tmdb_page(1..=20, 1, 25)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(tmdb_page(21..=25, 2, 25)),
        )
        .mount(&server)
        .await;

    let catalog = service_for(&server, CatalogSettings::default());
    let request = SearchRequest::new(CatalogSource::Tmdb, "");

    let first = catalog.search(&request).await;
    assert!(first.has_next);
    assert_eq!(first.total_results, Some(25));

    let second = catalog.search(&request.with_page(2)).await;
    assert_eq!(second.items.len(), 5);
    assert!(!second.has_next);

    // Negative upstream votes clamp to zero.
    assert!(second.items.iter().all(|c| c.rating_out_of_ten == 0.0));
}

#[tokio::test]
async fn ratings_are_normalized_to_ten_for_books() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(volumes(0..3, 3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ol_docs(0..3, 3)))
        .mount(&server)
        .await;

    let catalog = service_for(&server, CatalogSettings::default());

    let google = catalog
        .search(&SearchRequest::new(CatalogSource::GoogleBooks, "x"))
        .await;
    assert!(google.items.iter().all(|c| c.rating_out_of_ten == 9.0));
    assert!(!google.has_next);

    let ol = catalog
        .search(&SearchRequest::new(CatalogSource::OpenLibrary, "x"))
        .await;
    assert!(!ol.items.is_empty());
    assert!(
        ol.items
            .iter()
            .all(|c| (0.0..=10.0).contains(&c.rating_out_of_ten))
    );
    assert!(!ol.has_next);
}

#[tokio::test]
async fn upstream_status_degrades_and_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ol_docs(0..2, 2)))
        .mount(&server)
        .await;

    let catalog = service_for(&server, CatalogSettings::default());
    let request = SearchRequest::new(CatalogSource::OpenLibrary, "fox");

    let failed = catalog.search(&request).await;
    assert!(failed.items.is_empty());
    assert!(!failed.has_next);
    assert_eq!(
        failed.error.map(|e| e.kind),
        Some(CatalogErrorKind::UpstreamStatus)
    );

    let retried = catalog.search(&request).await;
    assert!(retried.error.is_none());
    assert_eq!(retried.items.len(), 2);
}

#[tokio::test]
async fn malformed_json_degrades_to_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let catalog = service_for(&server, CatalogSettings::default());
    let response = catalog
        .search(&SearchRequest::new(CatalogSource::GoogleBooks, "dune"))
        .await;

    assert!(response.items.is_empty());
    assert_eq!(
        response.error.map(|e| e.kind),
        Some(CatalogErrorKind::Malformed)
    );
}

#[tokio::test]
async fn slow_upstream_degrades_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ol_docs(0..2, 2))
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&server)
        .await;

    let catalog = service_with_timeout(
        &server,
        CatalogSettings::default(),
        Duration::from_millis(100),
    );
    let response = catalog
        .search(&SearchRequest::new(CatalogSource::OpenLibrary, "slow"))
        .await;

    assert!(response.items.is_empty());
    assert_eq!(
        response.error.map(|e| e.kind),
        Some(CatalogErrorKind::Timeout)
    );
}

#[tokio::test]
async fn paging_terminates_and_never_repeats_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(DriftingPager { overlap: 5 })
        .mount(&server)
        .await;

    let settings = CatalogSettings {
        max_page: 6,
        ..CatalogSettings::default()
    };
    let catalog = service_for(&server, settings);
    let request = SearchRequest::new(CatalogSource::OpenLibrary, "sea");

    let mut seen = HashSet::new();
    let mut page = 1;
    loop {
        let response = catalog.search(&request.clone().with_page(page)).await;
        for card in &response.items {
            assert!(
                seen.insert((card.id.clone(), card.media_type)),
                "card {} served twice",
                card.id
            );
        }
        if !response.has_next {
            break;
        }
        page += 1;
        assert!(page <= 6, "paging did not stop at max_page");
    }

    assert_eq!(page, 6);
    let beyond = catalog.search(&request.with_page(7)).await;
    assert!(beyond.items.is_empty());
    assert!(!beyond.has_next);
}

#[tokio::test]
async fn open_library_detail_survives_failed_lookups() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/works/OL45804W.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Fantastic Mr Fox",
            "description": { "type": "/type/text", "value": "A clever fox." },
            "subjects": ["Foxes", "Fiction"],
            "covers": [6498519],
            "authors": [{ "author": { "key": "/authors/OL34184A" } }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/authors/OL34184A.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "name": "Roald Dahl" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works/OL45804W/ratings.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let catalog = service_for(&server, CatalogSettings::default());
    let detail = catalog.open_library_book_detail("OL45804W").await.unwrap();

    assert_eq!(detail.card.title, "Fantastic Mr Fox");
    assert_eq!(detail.card.overview, "A clever fox.");
    assert_eq!(detail.creators, vec!["Roald Dahl".to_string()]);
    assert_eq!(detail.card.rating_out_of_ten, 0.0);
    assert_eq!(detail.card.media_type, MediaType::BookOl);
}

#[tokio::test]
async fn movie_detail_not_found_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status_message": "The resource you requested could not be found."
        })))
        .mount(&server)
        .await;

    let catalog = service_for(&server, CatalogSettings::default());
    let err = catalog.movie_detail(999).await.unwrap_err();
    assert!(matches!(err, ProviderError::NotFound));
}

#[tokio::test]
async fn genres_fall_back_when_tmdb_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/genre/movie/list"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let catalog = service_for(&server, CatalogSettings::default());
    let genres = catalog.genres().await;
    assert!(genres.iter().any(|g| g.id == "28" && g.name == "Action"));
}

#[tokio::test]
async fn tmdb_text_search_filters_genres_locally() {
    let server = MockServer::start().await;
    let results: Vec<Value> = (1..=20u64)
        .map(|id| {
            let genre = if id % 2 == 0 { 878 } else { 28 };
            json!({
                "id": id,
                "title": format!("Movie {id}"),
                "genre_ids": [genre]
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "alien"))
        .and(query_param("page", "1"))
        .and(query_param_is_missing("with_genres"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": results,
            "total_results": 60,
            "total_pages": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = service_for(&server, CatalogSettings::default());
    let request =
        SearchRequest::new(CatalogSource::Tmdb, "Alien").with_genre("878");
    let response = catalog.search(&request).await;

    assert!(response.error.is_none());
    assert_eq!(response.items.len(), 10);
    assert!(
        response
            .items
            .iter()
            .all(|card| card.id.parse::<u64>().unwrap() % 2 == 0)
    );
    // The filtered batch no longer knows its total; the full raw page
    // keeps paging open.
    assert_eq!(response.total_results, None);
    assert!(response.has_next);
}

#[tokio::test]
async fn discover_forwards_genre_year_and_rating_sort() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("with_genres", "878"))
        .and(query_param("primary_release_year", "1999"))
        .and(query_param("sort_by", "vote_average.desc"))
        .and(query_param("vote_count.gte", "200"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(tmdb_page(1..=20, 1, 45)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let catalog = service_for(&server, CatalogSettings::default());
    let mut request = SearchRequest::new(CatalogSource::Tmdb, "")
        .with_genre("Science Fiction");
    request.year = Some(1999);
    request.sort_by = Some(MovieSort::Rating);
    let response = catalog.search(&request).await;

    assert!(response.error.is_none());
    assert_eq!(response.items.len(), 20);
    assert_eq!(response.total_results, Some(45));
    assert!(response.has_next);
}

#[tokio::test]
async fn popularity_sort_does_not_require_votes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("sort_by", "popularity.desc"))
        .and(query_param_is_missing("vote_count.gte"))
        .and(query_param_is_missing("with_genres"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(tmdb_page(1..=20, 1, 20)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let catalog = service_for(&server, CatalogSettings::default());
    let response = catalog
        .search(&SearchRequest::new(CatalogSource::Tmdb, "").with_genre("all"))
        .await;

    assert_eq!(response.items.len(), 20);
    assert!(!response.has_next);
}

#[tokio::test]
async fn book_genres_become_upstream_subjects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .and(query_param("q", "dune subject:fantasy"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(volumes(0..5, 5)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "sea"))
        .and(query_param("subject", "fantasy"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(ol_docs(0..3, 3)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let catalog = service_for(&server, CatalogSettings::default());
    let google = catalog
        .search(
            &SearchRequest::new(CatalogSource::GoogleBooks, "dune")
                .with_genre("Fantasy"),
        )
        .await;
    let open_library = catalog
        .search(
            &SearchRequest::new(CatalogSource::OpenLibrary, "sea")
                .with_genre("fantasy"),
        )
        .await;

    assert_eq!(google.items.len(), 5);
    assert!(!google.has_next);
    assert_eq!(open_library.items.len(), 3);
    assert!(
        open_library
            .items
            .iter()
            .all(|card| card.media_type == MediaType::BookOl)
    );
}
