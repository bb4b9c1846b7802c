//! SQLite infrastructure adapters implementing the database ports.

pub mod repositories;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

use crate::database::ports::{
    BookmarksRepository, CommentsRepository, FriendshipsRepository,
    SessionsRepository, UsersRepository,
};
use crate::error::{CoreError, Result};

pub use repositories::bookmarks::SqliteBookmarksRepository;
pub use repositories::comments::SqliteCommentsRepository;
pub use repositories::friendships::SqliteFriendshipsRepository;
pub use repositories::sessions::SqliteSessionsRepository;
pub use repositories::users::SqliteUsersRepository;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const DEFAULT_MAX_CONNECTIONS: u32 = 8;

/// Shared pool plus one adapter per port.
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
    users: SqliteUsersRepository,
    sessions: SqliteSessionsRepository,
    bookmarks: SqliteBookmarksRepository,
    comments: SqliteCommentsRepository,
    friendships: SqliteFriendshipsRepository,
}

impl fmt::Debug for SqliteDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish_non_exhaustive()
    }
}

impl SqliteDatabase {
    /// Open (creating if missing) the database at `url`, e.g.
    /// `sqlite://reelshelf.db`.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| {
                CoreError::Internal(format!("Invalid database URL: {}", e))
            })?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "Database connection failed: {}",
                    e
                ))
            })?;

        info!(
            max_connections = DEFAULT_MAX_CONNECTIONS,
            "database pool initialized"
        );

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            users: SqliteUsersRepository::new(pool.clone()),
            sessions: SqliteSessionsRepository::new(pool.clone()),
            bookmarks: SqliteBookmarksRepository::new(pool.clone()),
            comments: SqliteCommentsRepository::new(pool.clone()),
            friendships: SqliteFriendshipsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Apply embedded migrations.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        info!("database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub fn users(&self) -> Arc<dyn UsersRepository> {
        Arc::new(self.users.clone())
    }

    pub fn sessions(&self) -> Arc<dyn SessionsRepository> {
        Arc::new(self.sessions.clone())
    }

    pub fn bookmarks(&self) -> Arc<dyn BookmarksRepository> {
        Arc::new(self.bookmarks.clone())
    }

    pub fn comments(&self) -> Arc<dyn CommentsRepository> {
        Arc::new(self.comments.clone())
    }

    pub fn friendships(&self) -> Arc<dyn FriendshipsRepository> {
        Arc::new(self.friendships.clone())
    }
}
