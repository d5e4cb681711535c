//! Database connection and pool management.

use exn::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{ErrorKind, Result};

/// Schema migrations, embedded at compile time and applied on every open.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
/// Editors, not crawlers. A handful of connections is plenty.
const MAX_CONNECTIONS: u32 = 4;
/// How long a connection waits for a write lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection pool for the video database.
///
/// Hand it to [`SqliteStore`](crate::SqliteStore) (via `From<&Database>`)
/// to read and write records.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn open(options: SqliteConnectOptions, pool: SqlitePoolOptions) -> Result<Self> {
        let pool = pool.connect_with(options.foreign_keys(true)).await.or_raise(|| ErrorKind::Database)?;
        MIGRATOR.run(&pool).await.or_raise(|| ErrorKind::Migration)?;
        debug!(migrations = MIGRATOR.iter().count(), "database schema is current");
        Ok(Self { pool })
    }

    /// Open (or create) the database file at `path` and run migrations.
    ///
    /// File databases use WAL journaling so that listings keep working while
    /// an editor saves.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);
        Self::open(options, SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)).await
    }

    /// Connect to a fresh in-memory database.
    ///
    /// The database lives exactly as long as its single connection, so that
    /// connection is never reaped for being idle or old. Not `#[cfg(test)]`
    /// so that other crates can use it in their tests too.
    pub async fn connect_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new().max_connections(1).min_connections(1).idle_timeout(None).max_lifetime(None);
        Self::open(SqliteConnectOptions::new().filename(":memory:"), pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all connections. The instance must not be used afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
