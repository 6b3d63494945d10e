//! Embedded SQLite engine, for local runs and tests.

use super::expect_one_row;
use crate::error::{ErrorKind, Result, SqlxResultExt};
use crate::filter::Filter;
use crate::record::{Record, RecordKey, RecordKind, RecordRow};
use crate::statement::SQLITE;
use crate::RecordStore;
use async_trait::async_trait;
use exn::ResultExt;
use sqlx::SqliteConnection;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use tracing::instrument;

/// Embedded migrations that are run automatically on connect.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations/sqlite");
const MAX_CONNECTIONS: u32 = 5;

/// Record store backed by a SQLite database file (or memory).
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    async fn new(options: SqliteConnectOptions, max: Option<u32>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            // Applies the query-based PRAGMAs to every pooled connection, not
            // only the first one.
            .after_connect(|conn, meta| Box::pin(async move { Self::apply_pragmas(conn, meta).await }))
            .max_connections(max.unwrap_or(MAX_CONNECTIONS))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Connect)?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Open (or create) the database file at the given path and run migrations.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Opening SQLite record store");
        let options = Self::base_options().filename(path).create_if_missing(true);
        Self::new(options, None).await
    }

    /// Connect to an in-memory database.
    ///
    /// Not restricted to `#[cfg(test)]` so that other crates can use it in
    /// their tests. The data is gone once the store is closed.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options().filename(":memory:");
        // Every connection to ":memory:" is its own database, so only one.
        Self::new(options, Some(1)).await
    }

    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // A crawl inserts one record at a time while queries may be
            // served concurrently; only one writer in WAL mode.
            .busy_timeout(std::time::Duration::from_millis(1500))
    }

    async fn apply_pragmas(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA wal_autocheckpoint = 800;
                PRAGMA cache_size = -8192;
                PRAGMA temp_store = MEMORY;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    #[instrument("performing database migrations", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn write(&self, statement: &str, key: &RecordKey, data: &str) -> Result<()> {
        sqlx::query(statement)
            .bind(key.org_name())
            .bind(key.name())
            .bind(key.version())
            .bind(data)
            .execute(&self.pool)
            .await
            .or_classify()?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn engine(&self) -> &'static str {
        "sqlite"
    }

    #[instrument(skip(self, key, data), fields(org = key.org_name(), name = key.name(), version = key.version()))]
    async fn upsert(&self, kind: RecordKind, key: &RecordKey, data: &str) -> Result<()> {
        self.write(&SQLITE.upsert(kind), key, data).await
    }

    #[instrument(skip(self, key, data), fields(org = key.org_name(), name = key.name(), version = key.version()))]
    async fn insert(&self, kind: RecordKind, key: &RecordKey, data: &str) -> Result<()> {
        self.write(&SQLITE.insert(kind), key, data).await
    }

    async fn query(&self, kind: RecordKind, filter: &Filter) -> Result<Vec<Record>> {
        let (statement, values) = SQLITE.select(kind, filter);
        let mut query = sqlx::query_as::<_, RecordRow>(&statement);
        for value in values {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await.or_classify()?;
        rows.into_iter().map(|row| row.into_record(kind)).collect()
    }

    #[instrument(skip(self, key), fields(org = key.org_name(), name = key.name(), version = key.version()))]
    async fn delete(&self, kind: RecordKind, key: &RecordKey) -> Result<()> {
        let result = sqlx::query(&SQLITE.delete(kind))
            .bind(key.org_name())
            .bind(key.name())
            .bind(key.version())
            .execute(&self.pool)
            .await
            .or_classify()?;
        expect_one_row(result.rows_affected())
    }

    async fn close(&self) {
        if self.pool.is_closed() {
            return;
        }
        // Let SQLite update query planner statistics
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}
