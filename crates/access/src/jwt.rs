//! JSON Web Token verification.

use crate::error::{ErrorKind, Result};
use crate::{Claims, ClaimsVerifier};
use async_trait::async_trait;
use exn::ResultExt;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use modcat_config::{AccessConfig, KeySource};
use std::str::FromStr;
use tracing::instrument;

/// Verifies signed JWTs and returns their claims.
///
/// Tokens must carry an `exp` claim. Issuer and audience are only checked
/// when configured.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;
        Self { key, validation }
    }

    /// Verifier for tokens signed with a shared secret (HS256).
    pub fn hmac(secret: impl AsRef<[u8]>) -> Self {
        Self::new(DecodingKey::from_secret(secret.as_ref()), Algorithm::HS256)
    }

    /// Verifier for tokens signed with an RSA key (RS256), given the PEM
    /// encoded public key.
    pub fn rsa_pem(pem: impl AsRef<[u8]>) -> Result<Self> {
        let key = DecodingKey::from_rsa_pem(pem.as_ref()).or_raise(|| ErrorKind::Key)?;
        Ok(Self::new(key, Algorithm::RS256))
    }

    /// Accept only `algorithm` instead of the key type's default.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.validation.algorithms = vec![algorithm];
        self
    }

    /// Require an `iss` claim equal to `issuer`.
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self.validation.required_spec_claims.insert("iss".to_string());
        self
    }

    /// Require an `aud` claim containing `audience`.
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self.validation.required_spec_claims.insert("aud".to_string());
        self
    }

    /// Build a verifier from configuration.
    ///
    /// Returns `None` when no key is configured: such a deployment can crawl
    /// and query, but every write will be refused.
    #[instrument(skip_all)]
    pub async fn from_config(config: &AccessConfig) -> Result<Option<Self>> {
        let algorithm = config
            .algorithm
            .as_deref()
            .map(Algorithm::from_str)
            .transpose()
            .or_raise(|| ErrorKind::Key)?;
        let verifier = match config.key().or_raise(|| ErrorKind::Key)? {
            None => return Ok(None),
            Some(KeySource::Secret(secret)) => {
                if let Some(algorithm) = algorithm
                    && !is_hmac(algorithm)
                {
                    exn::bail!(ErrorKind::Algorithm(format!("{algorithm:?}")));
                }
                Self::hmac(secret)
            },
            Some(KeySource::PublicKey(path)) => {
                if let Some(algorithm) = algorithm
                    && !is_rsa(algorithm)
                {
                    exn::bail!(ErrorKind::Algorithm(format!("{algorithm:?}")));
                }
                let pem = tokio::fs::read(path).await.or_raise(|| ErrorKind::Key)?;
                Self::rsa_pem(pem)?
            },
        };
        let mut verifier = match algorithm {
            Some(algorithm) => verifier.with_algorithm(algorithm),
            None => verifier,
        };
        if let Some(issuer) = &config.issuer {
            verifier = verifier.with_issuer(issuer);
        }
        if let Some(audience) = &config.audience {
            verifier = verifier.with_audience(audience);
        }
        Ok(Some(verifier))
    }
}

fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

fn is_rsa(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 | Algorithm::PS256 | Algorithm::PS384 | Algorithm::PS512
    )
}

#[async_trait]
impl ClaimsVerifier for JwtVerifier {
    async fn verify(&self, credential: &str) -> Result<Claims> {
        let token = decode::<Claims>(credential.trim(), &self.key, &self.validation)
            .inspect_err(|err| tracing::debug!(error = %err, "Rejected credential"))
            .or_raise(|| ErrorKind::InvalidCredential)?;
        Ok(token.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::{Value, json};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &str = "correct-horse-battery-staple";

    fn now() -> i64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64
    }

    fn mint(secret: &str, claims: Value) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn token(extra: Value) -> String {
        let mut claims = json!({"sub": "publisher", "exp": now() + 600, "catalog-allow": "openconfig"});
        if let (Some(claims), Value::Object(extra)) = (claims.as_object_mut(), extra) {
            claims.extend(extra);
        }
        mint(SECRET, claims)
    }

    #[tokio::test]
    async fn test_valid_token() {
        let claims = JwtVerifier::hmac(SECRET).verify(&token(json!({}))).await.unwrap();
        assert_eq!(claims.get("catalog-allow"), Some(&Value::from("openconfig")));
    }

    #[tokio::test]
    async fn test_surrounding_whitespace_is_ignored() {
        let credential = format!("{}\n", token(json!({})));
        assert!(JwtVerifier::hmac(SECRET).verify(&credential).await.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_secret() {
        let credential = mint("not-the-secret", json!({"exp": now() + 600}));
        let err = JwtVerifier::hmac(SECRET).verify(&credential).await.unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidCredential);
    }

    #[tokio::test]
    async fn test_expired() {
        let err = JwtVerifier::hmac(SECRET)
            .verify(&token(json!({"exp": now() - 3600})))
            .await
            .unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidCredential);
    }

    #[tokio::test]
    async fn test_not_a_token() {
        let err = JwtVerifier::hmac(SECRET).verify("hunter2").await.unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidCredential);
    }

    #[tokio::test]
    async fn test_issuer_and_audience() {
        let verifier = JwtVerifier::hmac(SECRET).with_issuer("idp").with_audience("catalog");
        let good = token(json!({"iss": "idp", "aud": "catalog"}));
        assert!(verifier.verify(&good).await.is_ok());
        let wrong_issuer = token(json!({"iss": "elsewhere", "aud": "catalog"}));
        assert!(verifier.verify(&wrong_issuer).await.is_err());
        let wrong_audience = token(json!({"iss": "idp", "aud": "other"}));
        assert!(verifier.verify(&wrong_audience).await.is_err());
    }

    #[tokio::test]
    async fn test_configured_audience_must_be_present() {
        let verifier = JwtVerifier::hmac(SECRET).with_audience("catalog");
        let err = verifier.verify(&token(json!({}))).await.unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidCredential);
        assert!(verifier.verify(&token(json!({"aud": "catalog"}))).await.is_ok());
    }

    #[tokio::test]
    async fn test_configured_issuer_must_be_present() {
        let verifier = JwtVerifier::hmac(SECRET).with_issuer("idp");
        let err = verifier.verify(&token(json!({}))).await.unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidCredential);
    }

    #[tokio::test]
    async fn test_audience_ignored_when_not_configured() {
        let credential = token(json!({"aud": "anything"}));
        assert!(JwtVerifier::hmac(SECRET).verify(&credential).await.is_ok());
    }

    #[test]
    fn test_invalid_pem() {
        let err = JwtVerifier::rsa_pem(b"-----BEGIN NONSENSE-----").err().unwrap();
        assert_eq!(*err, ErrorKind::Key);
    }

    #[tokio::test]
    async fn test_from_config_without_key() {
        assert!(JwtVerifier::from_config(&AccessConfig::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_from_config_secret() {
        let config = AccessConfig {
            secret: Some(SECRET.to_string()),
            algorithm: Some("HS256".to_string()),
            issuer: Some("idp".to_string()),
            ..AccessConfig::default()
        };
        let verifier = JwtVerifier::from_config(&config).await.unwrap().unwrap();
        assert!(verifier.verify(&token(json!({"iss": "idp"}))).await.is_ok());
        assert!(verifier.verify(&token(json!({}))).await.is_err());
    }

    #[tokio::test]
    async fn test_from_config_rejects_mismatched_algorithm() {
        let config = AccessConfig {
            secret: Some(SECRET.to_string()),
            algorithm: Some("RS256".to_string()),
            ..AccessConfig::default()
        };
        let err = JwtVerifier::from_config(&config).await.err().unwrap();
        assert_eq!(*err, ErrorKind::Algorithm("RS256".to_string()));
    }

    #[tokio::test]
    async fn test_from_config_rejects_hmac_algorithm_for_public_key() {
        let config = AccessConfig {
            public_key: Some(PathBuf::from("/definitely/not/here.pem")),
            algorithm: Some("HS256".to_string()),
            ..AccessConfig::default()
        };
        let err = JwtVerifier::from_config(&config).await.err().unwrap();
        assert_eq!(*err, ErrorKind::Algorithm("HS256".to_string()));
    }

    #[tokio::test]
    async fn test_from_config_missing_public_key() {
        let config = AccessConfig {
            public_key: Some(PathBuf::from("/definitely/not/here.pem")),
            ..AccessConfig::default()
        };
        let err = JwtVerifier::from_config(&config).await.err().unwrap();
        assert_eq!(*err, ErrorKind::Key);
    }
}
