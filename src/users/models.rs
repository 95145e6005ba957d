use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::ProfileUpdate;

/// Partial profile update; absent fields are left untouched
///
/// The registration rules apply to each field that is present.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(alias = "Username", default)]
    #[validate(
        length(min = 5, message = "Username must be at least 5 characters"),
        custom = "crate::validation::validate_username"
    )]
    pub username: Option<String>,

    #[serde(alias = "Password", default)]
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: Option<String>,

    #[serde(alias = "Email", default)]
    #[validate(email(message = "Email does not appear to be valid"))]
    pub email: Option<String>,

    #[serde(alias = "Birthday", default)]
    pub birthday: Option<NaiveDate>,
}

impl From<UpdateUserRequest> for ProfileUpdate {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            username: request.username,
            password: request.password,
            email: request.email,
            birthday: request.birthday,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPasswordRequest {
    #[serde(alias = "Username")]
    pub username: String,
    #[serde(alias = "Password")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyPasswordResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
