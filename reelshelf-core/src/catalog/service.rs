use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::cache::{BatchCache, BatchKey};
use super::model::{
    CatalogSource, Genre, MediaDetail, PersonDetail, SearchRequest,
    SearchResponse,
};
use super::normalize::dedup_cards;
use super::pagination::{PageWindow, has_next_from_total, has_next_heuristic};
use super::providers::tmdb::fallback_genres;
use super::providers::{
    BatchRequest, CatalogAdapter, GoogleBooksAdapter, OpenLibraryAdapter,
    ProviderError, TmdbAdapter, UpstreamBatch,
};

/// Tunables for [`CatalogService`].
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    /// Client-facing page length.
    pub page_size: u32,
    /// Highest page that may still report `hasNext`.
    pub max_page: u32,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_page: 50,
            cache_ttl: Duration::from_secs(600),
            cache_capacity: 512,
        }
    }
}

/// Aggregates the movie and book catalogs behind one paginated card API.
#[derive(Debug)]
pub struct CatalogService {
    tmdb: Arc<TmdbAdapter>,
    google: Arc<GoogleBooksAdapter>,
    open_library: Arc<OpenLibraryAdapter>,
    cache: BatchCache,
    genres: RwLock<Option<(Instant, Vec<Genre>)>>,
    settings: CatalogSettings,
}

impl CatalogService {
    pub fn new(
        tmdb: TmdbAdapter,
        google: GoogleBooksAdapter,
        open_library: OpenLibraryAdapter,
        settings: CatalogSettings,
    ) -> Self {
        Self {
            tmdb: Arc::new(tmdb),
            google: Arc::new(google),
            open_library: Arc::new(open_library),
            cache: BatchCache::new(settings.cache_ttl, settings.cache_capacity),
            genres: RwLock::new(None),
            settings,
        }
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    fn adapter(&self, source: CatalogSource) -> &dyn CatalogAdapter {
        match source {
            CatalogSource::Tmdb => self.tmdb.as_ref(),
            CatalogSource::GoogleBooks => self.google.as_ref(),
            CatalogSource::OpenLibrary => self.open_library.as_ref(),
        }
    }

    /// One client page of results. Upstream failures never escape: they
    /// come back as an empty page carrying `error`.
    pub async fn search(&self, request: &SearchRequest) -> SearchResponse {
        let source = request.source;
        let page = request.page.max(1);

        if page > self.settings.max_page {
            debug!(source = %source, page, "page beyond max_page");
            return SearchResponse::empty(source, page);
        }

        let adapter = self.adapter(source);
        let batch_size = adapter.batch_size();
        let window =
            PageWindow::for_page(page, self.settings.page_size, batch_size);
        let key = self.batch_key(request, window.batch_index);

        let batch = match self.load_batch(adapter, &key).await {
            Ok(batch) => batch,
            Err(err) => {
                warn!(
                    source = %source,
                    query = %key.query,
                    page,
                    kind = ?err.kind(),
                    error = %err,
                    "catalog upstream failed"
                );
                return SearchResponse::failed(
                    source,
                    page,
                    err.to_catalog_error(),
                );
            }
        };

        let items = window.slice(&batch.items).to_vec();
        let has_next = if page >= self.settings.max_page {
            false
        } else {
            match (batch.exact_total, batch.total_results) {
                (true, Some(total)) => {
                    has_next_from_total(page, self.settings.page_size, total)
                }
                _ => has_next_heuristic(
                    &window,
                    batch.items.len(),
                    batch.raw_len,
                    batch_size,
                    batch.next,
                ),
            }
        };

        SearchResponse {
            items,
            page,
            has_next,
            source,
            total_results: batch.total_results,
            error: None,
        }
    }

    fn batch_key(
        &self,
        request: &SearchRequest,
        batch_index: u32,
    ) -> BatchKey {
        let movies = request.source == CatalogSource::Tmdb;
        BatchKey {
            source: request.source,
            query: request.normalized_query(),
            genre: request.genre().map(str::to_lowercase),
            year: request.year.filter(|_| movies),
            sort: request.sort_by.filter(|_| movies),
            batch_index,
        }
    }

    async fn load_batch(
        &self,
        adapter: &dyn CatalogAdapter,
        key: &BatchKey,
    ) -> Result<Arc<UpstreamBatch>, ProviderError> {
        if let Some(hit) = self.cache.get(key) {
            debug!(
                source = %key.source,
                batch = key.batch_index,
                "batch cache hit"
            );
            return Ok(hit);
        }

        let request = BatchRequest {
            query: key.query.clone(),
            genre: key.genre.clone(),
            year: key.year,
            sort: key.sort,
        };
        let cursor = adapter.cursor_for_batch(key.batch_index);
        let mut batch = adapter.fetch_batch(&request, cursor).await?;

        // Upstream listings shift between calls; never show an item twice.
        let served: HashSet<String> = key
            .previous()
            .and_then(|prev| self.cache.get(&prev))
            .map(|prev| prev.items.iter().map(|c| c.id.clone()).collect())
            .unwrap_or_default();
        batch.items = dedup_cards(batch.items, &served);

        let batch = Arc::new(batch);
        self.cache.insert(key.clone(), Arc::clone(&batch));
        Ok(batch)
    }

    /// TMDB movie genres, cached. Falls back to a built-in list.
    pub async fn genres(&self) -> Vec<Genre> {
        if let Some((fetched_at, genres)) = self.genres.read().await.as_ref()
            && fetched_at.elapsed() < self.settings.cache_ttl
        {
            return genres.clone();
        }

        match self.tmdb.genres().await {
            Ok(genres) if !genres.is_empty() => {
                *self.genres.write().await =
                    Some((Instant::now(), genres.clone()));
                genres
            }
            Ok(_) => fallback_genres(),
            Err(err) => {
                warn!(error = %err, "tmdb genres unavailable, using fallback");
                fallback_genres()
            }
        }
    }

    /// Book genres offered to clients; ids are usable as `genreFilter`.
    pub fn book_genres(&self) -> Vec<Genre> {
        super::BOOK_GENRES
            .iter()
            .map(|(id, name)| Genre::new(*id, *name))
            .collect()
    }

    /// Trending movies of the week. Degrades like [`Self::search`].
    pub async fn featured(&self) -> SearchResponse {
        match self.tmdb.trending().await {
            Ok(items) => SearchResponse {
                items: dedup_cards(items, &HashSet::new()),
                ..SearchResponse::empty(CatalogSource::Tmdb, 1)
            },
            Err(err) => {
                warn!(error = %err, "tmdb trending failed");
                SearchResponse::failed(
                    CatalogSource::Tmdb,
                    1,
                    err.to_catalog_error(),
                )
            }
        }
    }

    pub async fn movie_detail(
        &self,
        id: u64,
    ) -> Result<MediaDetail, ProviderError> {
        self.tmdb.movie_detail(id).await.inspect_err(|err| {
            info!(id, error = %err, "movie detail failed");
        })
    }

    pub async fn person_detail(
        &self,
        id: u64,
    ) -> Result<PersonDetail, ProviderError> {
        self.tmdb.person_detail(id).await.inspect_err(|err| {
            info!(id, error = %err, "person detail failed");
        })
    }

    pub async fn google_book_detail(
        &self,
        id: &str,
    ) -> Result<MediaDetail, ProviderError> {
        self.google.volume_detail(id).await.inspect_err(|err| {
            info!(id, error = %err, "google books detail failed");
        })
    }

    pub async fn open_library_book_detail(
        &self,
        work_id: &str,
    ) -> Result<MediaDetail, ProviderError> {
        self.open_library
            .work_detail(work_id)
            .await
            .inspect_err(|err| {
                info!(work_id, error = %err, "open library detail failed");
            })
    }
}
