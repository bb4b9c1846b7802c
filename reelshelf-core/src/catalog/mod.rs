//! Movie and book catalog aggregation.
//!
//! Three upstreams with different item shapes and paging models are exposed
//! as one list of [`model::MediaCard`]s paged in fixed client-sized pages.

pub mod cache;
pub mod model;
pub mod normalize;
pub mod pagination;
pub mod providers;
pub mod service;

pub use model::{
    CatalogError, CatalogErrorKind, CatalogSource, Gender, Genre, MediaCard,
    MediaDetail, MediaType, MovieSort, PersonDetail, ProductionFacts,
    SearchRequest, SearchResponse,
};
pub use providers::{
    CatalogAdapter, GoogleBooksAdapter, OpenLibraryAdapter, ProviderError,
    TmdbAdapter,
};
pub use service::{CatalogService, CatalogSettings};

/// Book genres (subject keys) offered for book searches.
pub const BOOK_GENRES: &[(&str, &str)] = &[
    ("fiction", "Fiction"),
    ("fantasy", "Fantasy"),
    ("science_fiction", "Science Fiction"),
    ("romance", "Romance"),
    ("mystery", "Mystery"),
    ("horror", "Horror"),
    ("history", "History"),
];
