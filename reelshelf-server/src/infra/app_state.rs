use std::{fmt, sync::Arc};

use anyhow::{Context, Result};
use tracing::info;

use reelshelf_config::{CatalogConfig, Config};
use reelshelf_core::admin::AdminService;
use reelshelf_core::auth::{AuthCrypto, AuthService};
use reelshelf_core::catalog::providers::http_client;
use reelshelf_core::catalog::{
    CatalogService, CatalogSettings, GoogleBooksAdapter, OpenLibraryAdapter,
    TmdbAdapter,
};
use reelshelf_core::database::SqliteDatabase;
use reelshelf_core::social::{BookmarkService, CommentService, FriendService};
use reelshelf_core::users::UserService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub database: Arc<SqliteDatabase>,
    pub auth_service: Arc<AuthService>,
    pub catalog: Arc<CatalogService>,
    pub users: Arc<UserService>,
    pub bookmarks: Arc<BookmarkService>,
    pub comments: Arc<CommentService>,
    pub friends: Arc<FriendService>,
    pub admin: Arc<AdminService>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("database", &self.database)
            .field("dev_mode", &self.config.dev_mode)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Open the configured database, apply migrations and wire every
    /// service with production Argon2 parameters.
    pub async fn initialize(config: Config) -> Result<Self> {
        let database = SqliteDatabase::connect(&config.database.url)
            .await
            .with_context(|| {
                format!("failed to open database {}", config.database.url)
            })?;
        database
            .migrate()
            .await
            .context("failed to apply database migrations")?;
        info!(url = %config.database.url, "database ready");

        let crypto =
            AuthCrypto::new(&config.auth.password_pepper, &config.auth.token_key)
                .context("invalid auth secrets")?;

        Self::assemble(Arc::new(config), database, crypto)
    }

    /// Wire services over an already-migrated database.
    pub fn assemble(
        config: Arc<Config>,
        database: SqliteDatabase,
        crypto: AuthCrypto,
    ) -> Result<Self> {
        let hours = i64::try_from(config.auth.session_ttl_hours)
            .context("session_ttl_hours out of range")?;
        let session_ttl = chrono::Duration::try_hours(hours)
            .context("session_ttl_hours out of range")?;

        let auth_service = AuthService::new(
            database.users(),
            database.sessions(),
            Arc::new(crypto),
            session_ttl,
        );
        let catalog = build_catalog(&config.catalog)?;

        Ok(Self {
            auth_service: Arc::new(auth_service),
            catalog: Arc::new(catalog),
            users: Arc::new(UserService::new(database.users())),
            bookmarks: Arc::new(BookmarkService::new(
                database.bookmarks(),
                database.users(),
            )),
            comments: Arc::new(CommentService::new(database.comments())),
            friends: Arc::new(FriendService::new(
                database.friendships(),
                database.users(),
            )),
            admin: Arc::new(AdminService::new(
                database.users(),
                database.comments(),
            )),
            database: Arc::new(database),
            config,
        })
    }
}

fn build_catalog(config: &CatalogConfig) -> Result<CatalogService> {
    let http = http_client(config.request_timeout())
        .context("failed to build upstream HTTP client")?;

    let tmdb = TmdbAdapter::new(http.clone(), config.tmdb.api_key.clone())
        .with_base_url(&config.tmdb.base_url)
        .with_image_base_url(&config.tmdb.image_base_url)
        .with_language(config.tmdb.language.clone());
    let google =
        GoogleBooksAdapter::new(http.clone(), config.google_books.api_key.clone())
            .with_base_url(&config.google_books.base_url)
            .with_batch_size(config.google_books.batch_size);
    let open_library = OpenLibraryAdapter::new(http)
        .with_base_url(&config.open_library.base_url)
        .with_covers_base_url(&config.open_library.covers_base_url)
        .with_batch_size(config.open_library.batch_size);

    Ok(CatalogService::new(
        tmdb,
        google,
        open_library,
        CatalogSettings {
            page_size: config.page_size,
            max_page: config.max_page,
            cache_ttl: config.cache_ttl(),
            cache_capacity: config.cache_capacity,
        },
    ))
}
