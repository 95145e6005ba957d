// JWT token issuance and validation

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::auth::models::Identity;
use crate::auth::repository::IdentityRepository;

/// Access tokens live for 7 days (604800 seconds)
pub const TOKEN_LIFETIME_SECS: i64 = 7 * 24 * 60 * 60;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username at issuance
    pub uid: Uuid,   // identity id
    pub iat: i64,
    pub exp: i64,
}

/// Mints HS256 access tokens
///
/// Stateless: nothing is written anywhere when a token is issued.
pub struct TokenIssuer {
    key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token valid from now for `TOKEN_LIFETIME_SECS`
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (epoch seconds)
    pub fn issue_at(&self, identity: &Identity, now: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: identity.username.clone(),
            uid: identity.id,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }
}

/// Verifies access tokens and resolves them back to a live identity
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
    identities: Arc<dyn IdentityRepository>,
}

impl TokenValidator {
    pub fn new(secret: &str, identities: Arc<dyn IdentityRepository>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `check_expiry` so the boundary is exclusive and clock-injectable
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            identities,
        }
    }

    /// Check the signature and structure only
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected at decode: {}", e);
                AuthError::InvalidSignature
            })
    }

    /// A token is valid while `now < exp`
    pub fn check_expiry(claims: &Claims, now: i64) -> Result<(), AuthError> {
        if now >= claims.exp {
            return Err(AuthError::Expired);
        }
        Ok(())
    }

    /// Validate against the current time
    pub async fn validate(&self, token: &str) -> Result<Identity, AuthError> {
        self.validate_at(token, Utc::now().timestamp()).await
    }

    /// Validate as if the current time were `now`
    ///
    /// The subject is always re-resolved through the repository. A token whose
    /// identity was deleted, or renamed since issuance, fails as `UnknownSubject`.
    pub async fn validate_at(&self, token: &str, now: i64) -> Result<Identity, AuthError> {
        let claims = self.decode(token)?;
        Self::check_expiry(&claims, now)?;

        let identity = self
            .identities
            .find_by_id(claims.uid)
            .await?
            .filter(|identity| identity.has_username(&claims.sub))
            .ok_or_else(|| {
                debug!("Token subject '{}' no longer resolves", claims.sub);
                AuthError::UnknownSubject
            })?;

        Ok(identity)
    }
}
