use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::token::Claims;

/// Well-formed credential for a user that cannot exist. Verified against
/// when no record is found, so a lookup miss costs the same key derivation
/// as a password mismatch.
const DUMMY_CREDENTIAL: &str = "00000000000000000000000000000000:\
     0000000000000000000000000000000000000000000000000000000000000000\
     0000000000000000000000000000000000000000000000000000000000000000";

/// Verified identity attached to a request after successful authentication.
///
/// `expires_at` is populated when the principal was decoded from a token;
/// a principal freshly verified from credentials has not been issued one yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject_id: String,
    pub expires_at: Option<i64>,
}

impl From<&Claims> for Principal {
    fn from(claims: &Claims) -> Self {
        Self {
            subject_id: claims.sub.clone(),
            expires_at: Some(claims.exp),
        }
    }
}

/// Stored credential row, as the credential-check path sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Stable identifier the principal is built from
    pub subject_id: String,
    /// Serialized `hex(salt):hex(key)` credential
    pub credential: String,
}

/// Error from the backing credential store.
#[derive(Debug, Clone, Error)]
#[error("Credential store failure: {0}")]
pub struct CredentialStoreError(pub String);

/// Port for credential lookup.
///
/// Services adapt their user repository to this trait; the verifier never
/// sees anything of the user beyond its identifier and stored credential.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Look up the stored credential for an identifier (e.g. an email).
    ///
    /// # Returns
    /// The credential record, or None if no such principal exists
    ///
    /// # Errors
    /// * `CredentialStoreError` - The lookup itself failed
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError>;
}

/// Credential verification errors.
///
/// `InvalidCredentials` covers both "no such user" and "wrong password";
/// callers cannot tell the two apart. The other variants are internal
/// failures, surfaced to clients as generic server errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Hashing(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] CredentialStoreError),
}

/// Combines credential lookup and password verification into one operation.
pub struct CredentialVerifier<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
}

impl<S> CredentialVerifier<S>
where
    S: CredentialStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Verify a plaintext password for an identifier.
    ///
    /// The key derivation is CPU- and memory-expensive by design and runs on
    /// the blocking worker pool so it cannot stall token verification on the
    /// request fast path. If the caller goes away mid-derivation the work is
    /// abandoned with no side effects.
    ///
    /// # Returns
    /// Principal built from the record's stable identifier
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown identifier or wrong password,
    ///   indistinguishably
    /// * `Hashing` - KDF primitive failure
    /// * `Store` - Credential lookup failure
    pub async fn verify(&self, identifier: &str, password: &str) -> Result<Principal, AuthError> {
        let record = self.store.find_by_identifier(identifier).await?;

        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || verify_record(record, &password))
            .await
            .map_err(|e| PasswordError::HashingFailure(e.to_string()))??;

        match verified {
            Some(subject_id) => Ok(Principal {
                subject_id,
                expires_at: None,
            }),
            None => Err(AuthError::InvalidCredentials),
        }
    }
}

fn verify_record(
    record: Option<CredentialRecord>,
    password: &str,
) -> Result<Option<String>, PasswordError> {
    let hasher = PasswordHasher::new();
    match record {
        Some(record) => {
            let matched = hasher.verify(password, &record.credential)?;
            Ok(matched.then_some(record.subject_id))
        }
        None => {
            let _ = hasher.verify(password, DUMMY_CREDENTIAL)?;
            Ok(None)
        }
    }
}
