// Authentication module
// Credential verification, Argon2id hashing, JWT issuance/validation and the request gate

pub mod error;
pub mod handlers;
pub mod memory;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;
pub mod verifier;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::login_handler;
pub use memory::InMemoryIdentityRepository;
pub use middleware::{require_auth, AuthenticatedUser};
pub use models::{Identity, LoginRequest, LoginResponse, RegisterRequest, UserResponse};
pub use repository::{IdentityRepository, PgIdentityRepository};
pub use service::{AuthService, ProfileUpdate};
pub use token::{TokenIssuer, TokenValidator};
pub use verifier::CredentialVerifier;
