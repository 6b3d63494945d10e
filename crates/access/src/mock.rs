//! Fixed-answer verifier for testing.

use crate::error::{ErrorKind, Result};
use crate::{Claims, ClaimsVerifier};
use async_trait::async_trait;
use std::collections::HashMap;

/// Verifier that knows a fixed set of credentials and their claims.
///
/// Any credential not registered is rejected as
/// [`InvalidCredential`](ErrorKind::InvalidCredential).
#[derive(Debug, Default, Clone)]
pub struct StaticVerifier {
    credentials: HashMap<String, Claims>,
}

impl StaticVerifier {
    /// Register a credential with the given claims.
    pub fn with_claims(mut self, credential: impl Into<String>, claims: Claims) -> Self {
        self.credentials.insert(credential.into(), claims);
        self
    }

    /// Register a credential carrying a single string claim.
    pub fn with_claim(self, credential: impl Into<String>, field: impl Into<String>, value: impl Into<String>) -> Self {
        let mut claims = Claims::new();
        claims.insert(field.into(), serde_json::Value::String(value.into()));
        self.with_claims(credential, claims)
    }
}

#[async_trait]
impl ClaimsVerifier for StaticVerifier {
    async fn verify(&self, credential: &str) -> Result<Claims> {
        match self.credentials.get(credential) {
            Some(claims) => Ok(claims.clone()),
            None => exn::bail!(ErrorKind::InvalidCredential),
        }
    }
}
