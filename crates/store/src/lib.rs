//! Keyed record storage for the module catalog.
//!
//! Records are keyed by `(org_name, name, version)` and carry an opaque JSON
//! document. Two conflict policies are available and are deliberately kept
//! apart: [`RecordStore::upsert`] replaces the document of an existing key,
//! [`RecordStore::insert`] refuses to.
//!
//! Both engines embed and run their migrations on connect.

pub mod backend;
pub mod error;
mod filter;
mod record;
mod statement;

pub use crate::backend::{PostgresStore, SqliteStore};
pub use crate::filter::Filter;
pub use crate::record::{Record, RecordKey, RecordKind};

use crate::error::Result;
use async_trait::async_trait;
use modcat_config::Engine;
use std::sync::Arc;

/// Persistence for catalog records.
///
/// Every method is a single atomic statement; there is no application-level
/// locking or retrying.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Name of the engine (for logging).
    fn engine(&self) -> &'static str;

    /// Insert the record, or replace the document of an existing key.
    ///
    /// Returns [`Constraint`](crate::error::ErrorKind::Constraint) if the
    /// engine rejects `data`.
    async fn upsert(&self, kind: RecordKind, key: &RecordKey, data: &str) -> Result<()>;

    /// Insert a new record.
    ///
    /// Returns [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) if
    /// the key is taken.
    async fn insert(&self, kind: RecordKind, key: &RecordKey, data: &str) -> Result<()>;

    /// All records matching the filter, ordered by key.
    ///
    /// No match is an empty result, not an error.
    async fn query(&self, kind: RecordKind, filter: &Filter) -> Result<Vec<Record>>;

    /// Delete exactly one record.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if no record
    /// has the key, or [`Integrity`](crate::error::ErrorKind::Integrity) if
    /// more than one row was affected.
    async fn delete(&self, kind: RecordKind, key: &RecordKey) -> Result<()>;

    /// Release the connection pool. Calling it more than once is harmless.
    async fn close(&self);
}

pub type StoreHandle = Arc<dyn RecordStore>;

/// Connect to whichever engine the configuration selects.
pub async fn connect(engine: &Engine) -> Result<StoreHandle> {
    Ok(match engine {
        Engine::Sqlite(path) if path.as_os_str() == ":memory:" => Arc::new(SqliteStore::connect_in_memory().await?),
        Engine::Sqlite(path) => Arc::new(SqliteStore::connect(path).await?),
        Engine::Postgres(settings) => Arc::new(PostgresStore::connect(settings).await?),
    })
}
