//! Authorized access to the module catalog.
//!
//! [`Catalog`] is what clients talk to: writes go through the
//! [`AccessGate`] and document validation before they reach the
//! [`RecordStore`](modcat_store::RecordStore), reads go straight to it.

pub mod error;

use crate::error::{ErrorKind, Result};
use derive_more::Display;
use exn::ResultExt;
use modcat_access::AccessGate;
use modcat_document::{Document, FeatureBundle, Module};
use modcat_store::{Filter, Record, RecordKey, RecordKind, StoreHandle};
use tracing::instrument;

/// Outcome of a write, as reported to clients.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    #[display("Success")]
    Success,
    #[display("Fail")]
    Fail,
}

impl Status {
    pub fn of<T, E>(result: &std::result::Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(_) => Self::Fail,
        }
    }
}

/// A module record with the fields clients usually want pulled out of its
/// document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    pub record: Record,
    pub url: Option<String>,
    pub summary: Option<String>,
}

impl ModuleEntry {
    fn from_record(record: Record) -> Self {
        match Module::parse(&record.data) {
            Ok(module) => Self {
                url: module.uri().map(str::to_string),
                summary: module.summary,
                record,
            },
            Err(err) => {
                tracing::warn!(name = record.key.name(), version = record.key.version(), error = ?err, "Stored module document is not readable");
                Self {
                    record,
                    url: None,
                    summary: None,
                }
            },
        }
    }
}

/// The catalog as seen by clients.
///
/// Without an [`AccessGate`] the catalog is read-only: every write is
/// refused as [`Unauthorized`](ErrorKind::Unauthorized).
#[derive(Clone)]
pub struct Catalog {
    gate: Option<AccessGate>,
    store: StoreHandle,
}

impl Catalog {
    pub fn new(store: StoreHandle) -> Self {
        Self { gate: None, store }
    }

    pub fn with_gate(mut self, gate: AccessGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    async fn authorize(&self, credential: Option<&str>, org_name: &str) -> Result<()> {
        let unauthorized = || ErrorKind::Unauthorized(org_name.to_string());
        let Some(gate) = &self.gate else {
            tracing::warn!("No credential verifier configured, refusing write");
            exn::bail!(unauthorized());
        };
        let Some(credential) = credential else {
            exn::bail!(unauthorized());
        };
        if !gate.authorize(credential, org_name).await.or_raise(unauthorized)? {
            exn::bail!(unauthorized());
        }
        Ok(())
    }

    /// Store a document under `org_name`, replacing any record with the same
    /// name and version.
    ///
    /// The document is stored exactly as submitted.
    #[instrument(skip(self, credential, raw))]
    pub async fn create_or_update(
        &self,
        kind: RecordKind,
        credential: Option<&str>,
        org_name: &str,
        raw: &[u8],
    ) -> Result<Status> {
        self.authorize(credential, org_name).await?;
        let (name, version) = match kind {
            RecordKind::Module => key_of(Module::validate(raw)),
            RecordKind::FeatureBundle => key_of(FeatureBundle::validate(raw)),
        }
        .or_raise(|| ErrorKind::Validation)?;
        let data = std::str::from_utf8(raw).or_raise(|| ErrorKind::Validation)?;
        let key = RecordKey::new(org_name, name, version).or_raise(|| ErrorKind::Validation)?;
        self.store.upsert(kind, &key, data).await.map_err(ErrorKind::store)?;
        tracing::info!(name = key.name(), version = key.version(), "Record stored");
        Ok(Status::Success)
    }

    #[instrument(skip(self, credential))]
    pub async fn delete(
        &self,
        kind: RecordKind,
        credential: Option<&str>,
        org_name: &str,
        name: &str,
        version: &str,
    ) -> Result<Status> {
        self.authorize(credential, org_name).await?;
        let key = RecordKey::new(org_name, name, version).or_raise(|| ErrorKind::Validation)?;
        self.store.delete(kind, &key).await.map_err(ErrorKind::store)?;
        tracing::info!("Record deleted");
        Ok(Status::Success)
    }

    /// Records matching the filter. Reads need no credential.
    pub async fn query(&self, kind: RecordKind, filter: &Filter) -> Result<Vec<Record>> {
        self.store.query(kind, filter).await.map_err(ErrorKind::store)
    }

    /// Module records with their URL and summary.
    ///
    /// A record whose document can't be read is still returned, without
    /// either field.
    pub async fn modules(&self, filter: &Filter) -> Result<Vec<ModuleEntry>> {
        let records = self.query(RecordKind::Module, filter).await?;
        Ok(records.into_iter().map(ModuleEntry::from_record).collect())
    }
}

fn key_of<D: Document>(document: modcat_document::error::Result<D>) -> modcat_document::error::Result<(String, String)> {
    document.map(|document| (document.name().to_string(), document.version().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use modcat_access::StaticVerifier;
    use modcat_store::SqliteStore;
    use modcat_store::error::ErrorKind as StoreErrorKind;
    use rstest::rstest;
    use std::sync::Arc;

    const FIELD: &str = "modcat-allow";
    const MODULE: &str = r#"{"openconfig-module-catalog:name": "openconfig-acl", "openconfig-module-catalog:version": "1.2.0", "openconfig-module-catalog:summary": "ACLs", "openconfig-module-catalog:access": {"uri": "https://example.net/openconfig-acl.yang"}}"#;

    async fn catalog() -> Catalog {
        let verifier = StaticVerifier::default()
            .with_claim("acme-token", FIELD, "acme, widgets")
            .with_claim("other-token", FIELD, "other")
            .with_claim("no-claim-token", "something-else", "acme");
        let store = SqliteStore::connect_in_memory().await.unwrap();
        Catalog::new(Arc::new(store)).with_gate(AccessGate::new(Arc::new(verifier), FIELD))
    }

    async fn count(catalog: &Catalog, kind: RecordKind) -> usize {
        catalog.query(kind, &Filter::all()).await.unwrap().len()
    }

    #[tokio::test]
    async fn test_create_and_query() {
        let catalog = catalog().await;
        let status = catalog
            .create_or_update(RecordKind::Module, Some("acme-token"), "acme", MODULE.as_bytes())
            .await
            .unwrap();
        assert_eq!(status, Status::Success);

        let records = catalog.query(RecordKind::Module, &Filter::all().org_name("acme")).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, RecordKey::new("acme", "openconfig-acl", "1.2.0").unwrap());
        assert_eq!(records[0].data, MODULE);
        assert_eq!(count(&catalog, RecordKind::FeatureBundle).await, 0);
    }

    #[tokio::test]
    async fn test_update_replaces_document() {
        let catalog = catalog().await;
        let updated = MODULE.replace("ACLs", "Access control lists");
        for raw in [MODULE, updated.as_str()] {
            catalog
                .create_or_update(RecordKind::Module, Some("acme-token"), "acme", raw.as_bytes())
                .await
                .unwrap();
        }
        let entries = catalog.modules(&Filter::all()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].summary.as_deref(), Some("Access control lists"));
        assert_eq!(entries[0].url.as_deref(), Some("https://example.net/openconfig-acl.yang"));
    }

    #[rstest]
    #[case::no_credential(None, "acme")]
    #[case::unknown_credential(Some("forged"), "acme")]
    #[case::other_organization(Some("other-token"), "acme")]
    #[case::missing_claim(Some("no-claim-token"), "acme")]
    #[case::partial_name(Some("acme-token"), "acm")]
    #[tokio::test]
    async fn test_unauthorized_write_changes_nothing(#[case] credential: Option<&str>, #[case] org: &str) {
        let catalog = catalog().await;
        let err = catalog
            .create_or_update(RecordKind::Module, credential, org, MODULE.as_bytes())
            .await
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Unauthorized(org.to_string()));
        assert_eq!(count(&catalog, RecordKind::Module).await, 0);
    }

    #[tokio::test]
    async fn test_unauthorized_delete_keeps_record() {
        let catalog = catalog().await;
        catalog
            .create_or_update(RecordKind::Module, Some("acme-token"), "acme", MODULE.as_bytes())
            .await
            .unwrap();
        let err = catalog
            .delete(RecordKind::Module, Some("other-token"), "acme", "openconfig-acl", "1.2.0")
            .await
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Unauthorized("acme".to_string()));
        assert_eq!(count(&catalog, RecordKind::Module).await, 1);
    }

    #[rstest]
    #[case::not_json("{")]
    #[case::missing_name(r#"{"openconfig-module-catalog:version": "1.0.0"}"#)]
    #[case::missing_version(r#"{"openconfig-module-catalog:name": "openconfig-acl"}"#)]
    #[case::blank_version(r#"{"name": "openconfig-acl", "version": "  "}"#)]
    #[tokio::test]
    async fn test_invalid_document(#[case] raw: &str) {
        let catalog = catalog().await;
        let err = catalog
            .create_or_update(RecordKind::Module, Some("acme-token"), "acme", raw.as_bytes())
            .await
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Validation);
        assert_eq!(count(&catalog, RecordKind::Module).await, 0);
    }

    #[tokio::test]
    async fn test_feature_bundle() {
        let catalog = catalog().await;
        let bundle = r#"{"openconfig-module-catalog:name": "routing", "openconfig-module-catalog:version": "1.0.0", "openconfig-module-catalog:modules": {"module": [{"name": "openconfig-bgp", "version": "9.1.0"}]}}"#;
        catalog
            .create_or_update(RecordKind::FeatureBundle, Some("acme-token"), "widgets", bundle.as_bytes())
            .await
            .unwrap();
        assert_eq!(count(&catalog, RecordKind::FeatureBundle).await, 1);
        assert_eq!(count(&catalog, RecordKind::Module).await, 0);

        catalog
            .delete(RecordKind::FeatureBundle, Some("acme-token"), "widgets", "routing", "1.0.0")
            .await
            .unwrap();
        assert_eq!(count(&catalog, RecordKind::FeatureBundle).await, 0);
    }

    #[tokio::test]
    async fn test_without_gate_is_read_only() {
        let store = SqliteStore::connect_in_memory().await.unwrap();
        let catalog = Catalog::new(Arc::new(store));
        let err = catalog
            .create_or_update(RecordKind::Module, Some("acme-token"), "acme", MODULE.as_bytes())
            .await
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Unauthorized("acme".to_string()));
        assert!(catalog.query(RecordKind::Module, &Filter::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_record() {
        let catalog = catalog().await;
        let err = catalog
            .delete(RecordKind::Module, Some("acme-token"), "acme", "openconfig-acl", "1.2.0")
            .await
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Store(StoreErrorKind::NotFound));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_unreadable_stored_module() {
        let catalog = catalog().await;
        let key = RecordKey::new("acme", "odd", "1").unwrap();
        catalog.store().upsert(RecordKind::Module, &key, "[1, 2]").await.unwrap();
        let entries = catalog.modules(&Filter::all()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, None);
        assert_eq!(entries[0].summary, None);
    }
}
