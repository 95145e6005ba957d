// Identity records and the auth request/response DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Stored user account
///
/// Not `Serialize`: responses go through `UserResponse`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
    pub favorite_movies: Vec<Uuid>,
}

impl Identity {
    /// Case-insensitive username comparison, the same rule the repository enforces
    pub fn has_username(&self, username: &str) -> bool {
        self.username.to_lowercase() == username.to_lowercase()
    }
}

/// Fields for an atomic insert; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct IdentityChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<NaiveDate>,
}

/// User response model (excludes password_hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
    pub favorite_movies: Vec<Uuid>,
}

impl From<Identity> for UserResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username,
            email: identity.email,
            birthday: identity.birthday,
            favorite_movies: identity.favorite_movies,
        }
    }
}

/// Registration request DTO
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(alias = "Username")]
    #[validate(
        length(min = 5, message = "Username must be at least 5 characters"),
        custom = "crate::validation::validate_username"
    )]
    pub username: String,

    #[serde(alias = "Password")]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[serde(alias = "Email")]
    #[validate(email(message = "Email does not appear to be valid"))]
    pub email: String,

    #[serde(alias = "Birthday", default)]
    pub birthday: Option<NaiveDate>,
}

/// Login request DTO
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "Username")]
    pub username: String,
    #[serde(alias = "Password")]
    pub password: String,
}

/// Successful login: the account and a bearer token for it
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            username: "Alice123".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            email: "alice@example.com".to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 4, 1),
            favorite_movies: vec![],
        }
    }

    #[test]
    fn test_user_response_omits_password_hash() {
        let json = serde_json::to_string(&UserResponse::from(identity())).unwrap();

        assert!(json.contains("\"username\":\"Alice123\""));
        assert!(json.contains("\"birthday\":\"1990-04-01\""));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn test_has_username_ignores_case() {
        let identity = identity();
        assert!(identity.has_username("alice123"));
        assert!(identity.has_username("ALICE123"));
        assert!(!identity.has_username("alice12"));
    }

    #[test]
    fn test_register_request_accepts_pascal_case_keys() {
        let json = r#"{
            "Username": "alice123",
            "Password": "Secr3t!",
            "Email": "alice@example.com",
            "Birthday": "1990-04-01"
        }"#;

        let request: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.username, "alice123");
        assert_eq!(request.birthday, NaiveDate::from_ymd_opt(1990, 4, 1));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_register_request_validation() {
        let short = RegisterRequest {
            username: "abc".to_string(),
            password: "pw".to_string(),
            email: "alice@example.com".to_string(),
            birthday: None,
        };
        assert!(short.validate().is_err());

        let symbols = RegisterRequest {
            username: "alice_123".to_string(),
            ..short.clone()
        };
        assert!(symbols.validate().is_err());

        let bad_email = RegisterRequest {
            username: "alice123".to_string(),
            email: "not-an-email".to_string(),
            ..short.clone()
        };
        assert!(bad_email.validate().is_err());

        let empty_password = RegisterRequest {
            username: "alice123".to_string(),
            password: String::new(),
            ..short
        };
        assert!(empty_password.validate().is_err());
    }
}
