// Password hashing and verification service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::auth::error::AuthError;

/// Memory cost in KiB
const MEMORY_COST: u32 = 19_456;
/// Iterations
const TIME_COST: u32 = 2;
/// Lanes
const PARALLELISM: u32 = 1;

/// Password service for hashing and verification
///
/// Cost parameters are fixed; every hash in the store is produced with the
/// same Argon2id settings and a fresh random salt.
pub struct PasswordService;

impl PasswordService {
    fn hasher() -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, None)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a password using Argon2id, returning a PHC string
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        Self::hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHash(e.to_string()))
    }

    /// Verify a password against a stored PHC hash
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;

        match Self::hasher()?.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::PasswordHash(e.to_string())),
        }
    }

    /// Hashes on the blocking pool so request tasks are not stalled
    pub async fn hash_password_blocking(password: String) -> Result<String, AuthError> {
        tokio::task::spawn_blocking(move || Self::hash_password(&password))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
    }

    /// Verifies on the blocking pool so request tasks are not stalled
    pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || Self::verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_is_argon2id_phc_string() {
        let hash = PasswordService::hash_password("Secr3t!").unwrap();

        assert_ne!(hash, "Secr3t!");
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert!(!hash.contains("Secr3t!"));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let first = PasswordService::hash_password("Secr3t!").unwrap();
        let second = PasswordService::hash_password("Secr3t!").unwrap();

        assert_ne!(first, second);
        assert!(PasswordService::verify_password("Secr3t!", &first).unwrap());
        assert!(PasswordService::verify_password("Secr3t!", &second).unwrap());
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        let hash = PasswordService::hash_password("Secr3t!").unwrap();
        assert!(!PasswordService::verify_password("wrong", &hash).unwrap());
        assert!(!PasswordService::verify_password("secr3t!", &hash).unwrap());
    }

    #[test]
    fn test_corrupt_stored_hash_is_an_error() {
        let result = PasswordService::verify_password("Secr3t!", "not-a-phc-string");
        assert!(matches!(result, Err(AuthError::PasswordHash(_))));
    }

    #[tokio::test]
    async fn test_blocking_variants_agree() {
        let hash = PasswordService::hash_password_blocking("Secr3t!".to_string()).await.unwrap();
        assert!(PasswordService::verify_password_blocking("Secr3t!".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!PasswordService::verify_password_blocking("wrong".to_string(), hash)
            .await
            .unwrap());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_hash_never_equals_password_and_verifies(password in "\\PC{1,32}") {
            let hash = PasswordService::hash_password(&password)?;
            prop_assert_ne!(&hash, &password);
            prop_assert!(PasswordService::verify_password(&password, &hash)?);
        }

        #[test]
        fn prop_other_passwords_do_not_verify(
            password in "[a-zA-Z0-9!]{1,24}",
            other in "[a-zA-Z0-9!]{1,24}"
        ) {
            prop_assume!(password != other);
            let hash = PasswordService::hash_password(&password)?;
            prop_assert!(!PasswordService::verify_password(&other, &hash)?);
        }
    }
}
