//! Catalog document model.
//!
//! A catalog record stores its full document as opaque JSON. This crate is
//! the one place that knows what is inside: it turns raw bytes into a typed
//! [`Module`] or [`FeatureBundle`], checks that the document carries the key
//! the catalog indexes it by, and serializes it back.
//!
//! Documents use RFC 7951 style member names: top-level members are qualified
//! with the catalog's module name (`openconfig-module-catalog:name`), nested
//! members are not. Unqualified top-level names are accepted on input.

pub mod error;
mod models;

pub use crate::models::{Access, BundleModules, Dependencies, FeatureBundle, Module, ModuleReference, Submodule, Submodules};

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Qualifier used for the top-level members of every catalog document.
pub const CATALOG_MODULE: &str = "openconfig-module-catalog";

/// Behaviour shared by every kind of catalog document.
pub trait Document: Serialize + DeserializeOwned {
    /// Unique name of the document within its organization.
    fn name(&self) -> &str;

    /// Version of the document; together with the name it forms the key.
    fn version(&self) -> &str;

    /// Parse raw bytes without checking the key.
    fn parse(raw: impl AsRef<[u8]>) -> Result<Self> {
        serde_json::from_slice(raw.as_ref()).or_raise(|| ErrorKind::Malformed)
    }

    /// Parse raw bytes and require a non-empty name and version.
    ///
    /// This is the check every write has to pass before it reaches storage.
    fn validate(raw: impl AsRef<[u8]>) -> Result<Self> {
        let document = Self::parse(raw)?;
        if document.name().trim().is_empty() {
            exn::bail!(ErrorKind::MissingKey("name"));
        }
        if document.version().trim().is_empty() {
            exn::bail!(ErrorKind::MissingKey("version"));
        }
        Ok(document)
    }

    /// Serialize back into the indented JSON that gets stored.
    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).or_raise(|| ErrorKind::Serialize)
    }
}
