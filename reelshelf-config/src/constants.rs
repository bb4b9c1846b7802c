//! Built-in defaults.

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://reelshelf.db";

/// Placeholder secrets accepted only in dev mode.
pub const DEFAULT_PASSWORD_PEPPER: &str = "reelshelf-dev-password-pepper";
pub const DEFAULT_TOKEN_KEY: &str = "reelshelf-dev-token-key";
pub const DEFAULT_SESSION_TTL_HOURS: u64 = 24 * 7;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_MAX_PAGE: u32 = 50;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const DEFAULT_GOOGLE_BOOKS_BASE_URL: &str =
    "https://www.googleapis.com/books/v1";
pub const DEFAULT_OPEN_LIBRARY_BASE_URL: &str = "https://openlibrary.org";
pub const DEFAULT_OPEN_LIBRARY_COVERS_BASE_URL: &str =
    "https://covers.openlibrary.org";
pub const DEFAULT_BOOK_BATCH_SIZE: u32 = 40;
/// Largest batch the Google Books volumes endpoint serves.
pub const GOOGLE_BOOKS_MAX_BATCH: u32 = 40;
/// TMDB always pages in twenties.
pub const TMDB_BATCH_SIZE: u32 = 20;

pub const CONFIG_PATH_ENV: &str = "REELSHELF_CONFIG";
