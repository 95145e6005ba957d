// HTTP handlers for authentication endpoints

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use std::sync::Arc;

use crate::auth::{
    models::{LoginRequest, LoginResponse},
    service::AuthService,
};
use crate::error::ApiError;

/// Login a user
/// POST /login
///
/// Every credential failure answers 400 with the same generic body.
pub async fn login_handler(
    State(service): State<Arc<AuthService>>,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<Json<LoginResponse>, ApiError> {
    tracing::debug!("Login attempt for {}", request.username);

    service
        .login(&request.username, &request.password)
        .await
        .map(Json)
        .map_err(|e| {
            if e.is_credential_failure() {
                tracing::warn!(reason = %e, "Login failed for {}", request.username);
                ApiError::LoginFailed
            } else {
                e.into()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        models::RegisterRequest, CredentialVerifier, InMemoryIdentityRepository, TokenIssuer,
    };
    use axum::{http::StatusCode, routing::post, Router};
    use axum_test::TestServer;
    use serde_json::json;

    async fn server() -> TestServer {
        let repo = Arc::new(InMemoryIdentityRepository::new());
        let verifier = CredentialVerifier::new(repo.clone()).unwrap();
        let service = Arc::new(AuthService::new(repo, verifier, TokenIssuer::new("login_test_secret")));
        service
            .register(RegisterRequest {
                username: "alice123".to_string(),
                password: "Secr3t!".to_string(),
                email: "alice@example.com".to_string(),
                birthday: None,
            })
            .await
            .unwrap();

        let app = Router::new().route("/login", post(login_handler)).with_state(service);
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_login_success_returns_user_and_token() {
        let server = server().await;
        let response = server
            .post("/login")
            .json(&json!({"Username": "alice123", "Password": "Secr3t!"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["user"]["username"], "alice123");
        assert!(body["user"].get("password_hash").is_none());
        assert_eq!(body["token"].as_str().unwrap().split('.').count(), 3);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_identical() {
        let server = server().await;

        let wrong = server
            .post("/login")
            .json(&json!({"username": "alice123", "password": "wrong"}))
            .await;
        let unknown = server
            .post("/login")
            .json(&json!({"username": "nobody99", "password": "Secr3t!"}))
            .await;

        for response in [&wrong, &unknown] {
            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        }
        let wrong: serde_json::Value = wrong.json();
        let unknown: serde_json::Value = unknown.json();
        assert_eq!(wrong["error_code"], unknown["error_code"]);
        assert_eq!(wrong["message"], "Authentication failed");
        assert_eq!(unknown["message"], "Authentication failed");
    }
}
