// Authentication service - business logic layer

use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    models::{Identity, IdentityChanges, LoginResponse, NewIdentity, RegisterRequest},
    password::PasswordService,
    repository::IdentityRepository,
    token::TokenIssuer,
    verifier::CredentialVerifier,
};

/// Profile fields a user may change; the password arrives in plaintext
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<chrono::NaiveDate>,
}

/// Authentication service coordinating registration, login and credential changes
pub struct AuthService {
    identities: Arc<dyn IdentityRepository>,
    verifier: CredentialVerifier,
    issuer: TokenIssuer,
}

impl AuthService {
    pub fn new(identities: Arc<dyn IdentityRepository>, verifier: CredentialVerifier, issuer: TokenIssuer) -> Self {
        Self {
            identities,
            verifier,
            issuer,
        }
    }

    /// Register a new user
    ///
    /// Hashes first, then performs a single atomic insert; a concurrent
    /// registration of the same username loses with `DuplicateUsername`.
    pub async fn register(&self, request: RegisterRequest) -> Result<Identity, AuthError> {
        let password_hash = PasswordService::hash_password_blocking(request.password).await?;

        let identity = self
            .identities
            .create(NewIdentity {
                username: request.username,
                password_hash,
                email: request.email,
                birthday: request.birthday,
            })
            .await?;

        tracing::info!("Registered user {} ({})", identity.username, identity.id);
        Ok(identity)
    }

    /// Verify credentials and issue an access token
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let identity = self.verifier.verify(username, password).await?;
        let token = self.issuer.issue(&identity)?;

        tracing::info!("User {} logged in", identity.username);
        Ok(LoginResponse {
            user: identity.into(),
            token,
        })
    }

    /// Verify credentials without issuing anything
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        self.verifier.verify(username, password).await
    }

    /// Apply a profile update, re-hashing the password when one is supplied
    ///
    /// Previously issued tokens stay valid unless the username changes.
    pub async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<Identity>, AuthError> {
        let password_hash = match update.password {
            Some(password) => Some(PasswordService::hash_password_blocking(password).await?),
            None => None,
        };

        let changes = IdentityChanges {
            username: update.username,
            password_hash,
            email: update.email,
            birthday: update.birthday,
        };
        Ok(self.identities.update(id, changes).await?)
    }
}
