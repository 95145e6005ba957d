// Account routes: registration, profile management and favorites

pub mod handlers;
pub mod models;

pub use models::{MessageResponse, UpdateUserRequest, VerifyPasswordRequest, VerifyPasswordResponse};
