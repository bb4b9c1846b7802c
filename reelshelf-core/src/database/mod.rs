//! Persistence: repository ports and their SQLite adapters.

pub mod infrastructure;
pub mod ports;

pub use infrastructure::sqlite::SqliteDatabase;
