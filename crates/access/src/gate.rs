use crate::VerifierHandle;
use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use serde_json::Value;
use tracing::instrument;

const CLAIM_SUFFIX: &str = "-allow";
const SEPARATOR: char = ',';

/// Name of the allow-claim for a catalog namespace.
pub fn claim_field(namespace: &str) -> String {
    format!("{namespace}{CLAIM_SUFFIX}")
}

/// Encode organization names into an allow-claim value.
///
/// The inverse of what [`AccessGate`] does when reading the claim.
pub fn encode_allowed<I, S>(organizations: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let organizations: Vec<String> = organizations
        .into_iter()
        .map(|org| org.as_ref().trim().to_string())
        .filter(|org| !org.is_empty())
        .collect();
    organizations.join(&SEPARATOR.to_string())
}

/// Decides whether the holder of a credential may write to an organization.
#[derive(Clone)]
pub struct AccessGate {
    verifier: VerifierHandle,
    field: String,
}

impl AccessGate {
    /// Gate reading the allow-claim from `field`.
    pub fn new(verifier: VerifierHandle, field: impl Into<String>) -> Self {
        Self {
            verifier,
            field: field.into(),
        }
    }

    /// Gate reading the allow-claim of a catalog namespace (the database name
    /// unless configured otherwise).
    pub fn for_namespace(verifier: VerifierHandle, namespace: &str) -> Self {
        Self::new(verifier, claim_field(namespace))
    }

    /// Name of the claim this gate reads.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Organizations the credential grants write access to.
    #[instrument(skip_all, fields(field = %self.field))]
    pub async fn allowed_organizations(&self, credential: &str) -> Result<Vec<String>> {
        let claims = self.verifier.verify(credential).await?;
        let claim = claims
            .get(&self.field)
            .ok_or_raise(|| ErrorKind::MissingClaim(self.field.clone()))?;
        let Value::String(allowed) = claim else {
            exn::bail!(ErrorKind::MalformedClaim(self.field.clone()));
        };
        Ok(allowed
            .split(SEPARATOR)
            .map(str::trim)
            .filter(|org| !org.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Whether the credential allows writing to `org_name`.
    ///
    /// A valid credential that doesn't list the organization is `Ok(false)`,
    /// not an error.
    pub async fn authorize(&self, credential: &str, org_name: &str) -> Result<bool> {
        let allowed = self.allowed_organizations(credential).await?;
        let authorized = allowed.iter().any(|org| org == org_name);
        if !authorized {
            tracing::debug!(org = org_name, "Organization not granted by credential");
        }
        Ok(authorized)
    }
}
