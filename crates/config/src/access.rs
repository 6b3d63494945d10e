use crate::error::{ErrorKind, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings for verifying the credentials that accompany write operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Namespace of the access claim, see [`Config::claim_namespace`](crate::Config::claim_namespace).
    pub namespace: Option<String>,
    /// Shared HMAC secret.
    pub secret: Option<String>,
    /// PEM-encoded public key file for asymmetric signatures.
    pub public_key: Option<PathBuf>,
    /// Signature algorithm name (`HS256`, `RS256`, ...).
    pub algorithm: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

/// Where the verification key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource<'a> {
    Secret(&'a str),
    PublicKey(&'a Path),
}

impl AccessConfig {
    /// The configured verification key, if any.
    ///
    /// Configuring both a secret and a public key is ambiguous and rejected.
    pub fn key(&self) -> Result<Option<KeySource<'_>>> {
        match (self.secret.as_deref(), self.public_key.as_deref()) {
            (Some(_), Some(_)) => exn::bail!(ErrorKind::Invalid("MODCAT_ACCESS_SECRET")),
            (Some(""), None) => exn::bail!(ErrorKind::Invalid("MODCAT_ACCESS_SECRET")),
            (Some(secret), None) => Ok(Some(KeySource::Secret(secret))),
            (None, Some(path)) => Ok(Some(KeySource::PublicKey(path))),
            (None, None) => Ok(None),
        }
    }
}
