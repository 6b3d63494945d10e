//! PostgreSQL engine, used in production.
//!
//! Documents are stored as `jsonb`, so malformed JSON is rejected by the
//! server itself and reported as a constraint violation.

use super::expect_one_row;
use crate::RecordStore;
use crate::error::{ErrorKind, Result, SqlxResultExt};
use crate::filter::Filter;
use crate::record::{Record, RecordKey, RecordKind, RecordRow};
use crate::statement::POSTGRES;
use async_trait::async_trait;
use exn::ResultExt;
use modcat_config::{Endpoint, PostgresSettings};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use std::str::FromStr;
use tracing::instrument;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations/postgres");

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    async fn new(options: PgConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Connect)?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Connect with validated settings and run migrations.
    ///
    /// `localhost` is reached over TCP without TLS (a local server, or the
    /// Cloud SQL proxy); any other host is treated as the name of a managed
    /// instance whose Unix socket lives in the configured socket directory.
    pub async fn connect(settings: &PostgresSettings) -> Result<Self> {
        let options = PgConnectOptions::new()
            .port(settings.port)
            .username(&settings.username)
            .password(&settings.password)
            .database(&settings.database);
        let options = match &settings.endpoint {
            Endpoint::Tcp(host) => {
                tracing::debug!(%host, port = settings.port, "Connecting to PostgreSQL over TCP");
                options.host(host).ssl_mode(PgSslMode::Disable)
            },
            Endpoint::Socket(dir) => {
                tracing::debug!(socket = %dir.display(), "Connecting to PostgreSQL over Unix socket");
                options.socket(dir)
            },
        };
        Self::new(options, settings.max_connections).await
    }

    /// Connect with a `postgres://` URL and run migrations.
    pub async fn connect_url(url: &str) -> Result<Self> {
        let options = PgConnectOptions::from_str(url).or_raise(|| ErrorKind::Connect)?;
        Self::new(options, 1).await
    }

    #[instrument("performing database migrations", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    pub fn pool(&self) -> &PgPool {
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
impl RecordStore for PostgresStore {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    #[instrument(skip(self, key, data), fields(org = key.org_name(), name = key.name(), version = key.version()))]
    async fn upsert(&self, kind: RecordKind, key: &RecordKey, data: &str) -> Result<()> {
        self.write(&POSTGRES.upsert(kind), key, data).await
    }

    #[instrument(skip(self, key, data), fields(org = key.org_name(), name = key.name(), version = key.version()))]
    async fn insert(&self, kind: RecordKind, key: &RecordKey, data: &str) -> Result<()> {
        self.write(&POSTGRES.insert(kind), key, data).await
    }

    async fn query(&self, kind: RecordKind, filter: &Filter) -> Result<Vec<Record>> {
        let (statement, values) = POSTGRES.select(kind, filter);
        let mut query = sqlx::query_as::<_, RecordRow>(&statement);
        for value in values {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await.or_classify()?;
        rows.into_iter().map(|row| row.into_record(kind)).collect()
    }

    #[instrument(skip(self, key), fields(org = key.org_name(), name = key.name(), version = key.version()))]
    async fn delete(&self, kind: RecordKind, key: &RecordKey) -> Result<()> {
        let result = sqlx::query(&POSTGRES.delete(kind))
            .bind(key.org_name())
            .bind(key.name())
            .bind(key.version())
            .execute(&self.pool)
            .await
            .or_classify()?;
        expect_one_row(result.rows_affected())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
