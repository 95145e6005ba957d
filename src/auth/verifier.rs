// Credential verification against stored password hashes

use std::sync::Arc;
use tracing::debug;

use crate::auth::error::AuthError;
use crate::auth::models::Identity;
use crate::auth::password::PasswordService;
use crate::auth::repository::IdentityRepository;

/// Checks a username/password pair against the identity repository
pub struct CredentialVerifier {
    identities: Arc<dyn IdentityRepository>,
    decoy_hash: String,
}

impl CredentialVerifier {
    /// Builds the verifier and the decoy hash used for unknown usernames
    pub fn new(identities: Arc<dyn IdentityRepository>) -> Result<Self, AuthError> {
        let decoy_hash = PasswordService::hash_password("decoy-password-never-matches")?;
        Ok(Self {
            identities,
            decoy_hash,
        })
    }

    /// Returns the identity when the password matches its stored hash
    ///
    /// `UnknownUser` and `BadPassword` are kept apart for logging only; an
    /// unknown username still pays for one hash verification.
    pub async fn verify(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let Some(identity) = self.identities.find_by_username(username).await? else {
            PasswordService::verify_password_blocking(password.to_owned(), self.decoy_hash.clone()).await?;
            debug!("Login for unknown username '{}'", username);
            return Err(AuthError::UnknownUser);
        };

        let matches =
            PasswordService::verify_password_blocking(password.to_owned(), identity.password_hash.clone())
                .await?;
        if !matches {
            debug!("Password mismatch for '{}'", identity.username);
            return Err(AuthError::BadPassword);
        }

        Ok(identity)
    }
}
