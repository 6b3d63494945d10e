use crate::crawl::{Crawl, UrlIndex};
use crate::error::{ErrorKind, Result};
use crate::populate::populate;
use crate::yang::SourceModule;
use exn::ResultExt;
use modcat_document::Document;
use modcat_store::error::ErrorKind as StoreErrorKind;
use modcat_store::{Filter, RecordKey, RecordKind, RecordStore};
use tracing::instrument;

/// What happened to one crawled module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingest {
    Inserted,
    /// A record with the same name and version exists (in any organization)
    /// and was left untouched.
    AlreadyExists,
    /// The module has no version and was not ingested.
    Skipped,
}

/// Tally of an ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    pub existing: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Ingest one module, never overwriting a cataloged `(name, version)`.
#[instrument(skip_all, fields(name = %module.name))]
pub async fn ingest_module(
    store: &dyn RecordStore,
    org_name: &str,
    module: &SourceModule,
    urls: &UrlIndex,
) -> Result<Ingest> {
    let Some(document) = populate(module, urls)? else {
        return Ok(Ingest::Skipped);
    };
    let data = document.to_json().or_raise(|| ErrorKind::Document)?;
    let filter = Filter::all().name(document.name()).version(document.version());
    let existing = store.query(RecordKind::Module, &filter).await.or_raise(|| ErrorKind::Store)?;
    if !existing.is_empty() {
        tracing::info!(version = document.version(), "Module already cataloged, not updating");
        return Ok(Ingest::AlreadyExists);
    }
    let key = RecordKey::new(org_name, document.name(), document.version()).or_raise(|| ErrorKind::Store)?;
    match store.insert(RecordKind::Module, &key, &data).await {
        Ok(()) => {
            tracing::info!(version = document.version(), "Module inserted");
            Ok(Ingest::Inserted)
        },
        // Inserted by someone else since the query.
        Err(err) if *err == StoreErrorKind::AlreadyExists => Ok(Ingest::AlreadyExists),
        Err(err) => Err(err).or_raise(|| ErrorKind::Store),
    }
}

/// Ingest every crawled module on behalf of `org_name`, in name order.
///
/// A failure only affects its own module: it is logged and counted, and the
/// run carries on.
#[instrument(skip(store, crawl), fields(modules = crawl.names.len()))]
pub async fn ingest(store: &dyn RecordStore, org_name: &str, crawl: &Crawl) -> IngestReport {
    let mut report = IngestReport::default();
    for module in crawl.iter() {
        match ingest_module(store, org_name, module, &crawl.urls).await {
            Ok(Ingest::Inserted) => report.inserted += 1,
            Ok(Ingest::AlreadyExists) => report.existing += 1,
            Ok(Ingest::Skipped) => report.skipped += 1,
            Err(err) => {
                tracing::error!(name = %module.name, error = ?err, "Failed to ingest module");
                report.failed += 1;
            },
        }
    }
    tracing::info!(
        inserted = report.inserted,
        existing = report.existing,
        skipped = report.skipped,
        failed = report.failed,
        "Ingestion complete"
    );
    report
}
