//! Write authorization for the module catalog.
//!
//! Every write to the catalog is made on behalf of an organization. The
//! caller presents a credential; a [`ClaimsVerifier`] checks it and hands
//! back its claims, and the [`AccessGate`] looks for the catalog's
//! allow-claim: a comma-separated list of organization names the holder may
//! write to.
//!
//! The allow-claim is named `<namespace>-allow` (see [`claim_field`]) so that
//! a single identity provider can grant access to several catalogs.

pub mod error;
mod gate;
mod jwt;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use crate::gate::{AccessGate, claim_field, encode_allowed};
pub use crate::jwt::JwtVerifier;
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::StaticVerifier;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Claims of a verified credential, as a JSON object.
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Turns an opaque credential into verified claims.
#[async_trait]
pub trait ClaimsVerifier: Send + Sync {
    /// Verify the credential and return its claims.
    ///
    /// Any reason for rejecting the credential must be reported as
    /// [`InvalidCredential`](crate::error::ErrorKind::InvalidCredential).
    async fn verify(&self, credential: &str) -> Result<Claims>;
}

pub type VerifierHandle = Arc<dyn ClaimsVerifier>;
