// Authorization gate for protected routes

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::auth::{error::AuthError, models::Identity, token::TokenValidator};
use crate::error::ApiError;

/// Identity resolved by the gate, attached to the request extensions
///
/// Read-only: handlers that change an account go through the repository.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    identity: Arc<Identity>,
}

impl AuthenticatedUser {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity: Arc::new(identity),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Allow the call only when `username` names the caller's own account
    pub fn ensure_owner(&self, username: &str) -> Result<(), ApiError> {
        if self.identity.has_username(username) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "'{}' may not act on account '{}'",
                self.identity.username, username
            )))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only present when the route sits behind `require_auth`
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::MissingCredential)
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
///
/// A missing header, another scheme or an empty token all count as no
/// credential. A header that is not visible ASCII is a malformed one.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::InvalidSignature)?;

    match value.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::MissingCredential),
    }
}

/// Gate middleware: Unauthenticated -> TokenPresent -> Authorized | Rejected
///
/// On rejection the inner handler is never called.
pub async fn require_auth(
    State(validator): State<Arc<TokenValidator>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let endpoint = request.uri().path().to_string();

    let token = bearer_token(request.headers())
        .map_err(|e| {
            debug!("No usable bearer token for protected endpoint {}: {}", endpoint, e);
            e
        })?
        .to_string();

    let identity = validator.validate(&token).await.map_err(|e| {
        debug!(reason = %e, "Token rejected for endpoint {}", endpoint);
        e
    })?;

    debug!("Authorized user {} for endpoint {}", identity.username, endpoint);
    request.extensions_mut().insert(AuthenticatedUser::new(identity));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::memory::InMemoryIdentityRepository;
    use crate::auth::models::NewIdentity;
    use crate::auth::repository::IdentityRepository;
    use crate::auth::token::TokenIssuer;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const SECRET: &str = "test_secret_key_for_testing_purposes";

    struct Harness {
        app: Router,
        repo: Arc<InMemoryIdentityRepository>,
        identity: Identity,
        hits: Arc<AtomicUsize>,
    }

    async fn harness() -> Harness {
        let repo = Arc::new(InMemoryIdentityRepository::new());
        let identity = repo
            .create(NewIdentity {
                username: "alice123".to_string(),
                password_hash: "$argon2id$placeholder".to_string(),
                email: "alice@example.com".to_string(),
                birthday: None,
            })
            .await
            .unwrap();

        let validator = Arc::new(TokenValidator::new(SECRET, repo.clone()));
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        let app = Router::new()
            .route(
                "/whoami",
                get(move |user: AuthenticatedUser| {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        user.identity().username.clone()
                    }
                }),
            )
            .route_layer(middleware::from_fn_with_state(validator, require_auth));

        Harness {
            app,
            repo,
            identity,
            hits,
        }
    }

    fn request(auth: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/whoami");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Err(AuthError::MissingCredential)));

        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");

        headers.insert(header::AUTHORIZATION, "bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");

        for value in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer   ", "token_without_scheme"] {
            headers.insert(header::AUTHORIZATION, value.parse().unwrap());
            assert!(matches!(bearer_token(&headers), Err(AuthError::MissingCredential)));
        }
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_identity() {
        let h = harness().await;
        let token = TokenIssuer::new(SECRET).issue(&h.identity).unwrap();

        let response = h
            .app
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "alice123");
        assert_eq!(h.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_header_is_rejected_before_handler() {
        let h = harness().await;

        let response = h.app.oneshot(request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(response).await.contains("MISSING_CREDENTIAL"));
        assert_eq!(h.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected_generically() {
        let h = harness().await;

        let response = h
            .app
            .oneshot(request(Some("Bearer not.a.valid.jwt")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_string(response).await;
        assert!(body.contains("AUTHENTICATION_FAILED"));
        assert!(!body.to_lowercase().contains("signature"));
        assert_eq!(h.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected_generically() {
        let h = harness().await;
        let issued = chrono::Utc::now().timestamp() - crate::auth::token::TOKEN_LIFETIME_SECS - 1;
        let token = TokenIssuer::new(SECRET).issue_at(&h.identity, issued).unwrap();

        let response = h
            .app
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_string(response).await;
        assert!(body.contains("AUTHENTICATION_FAILED"));
        assert!(!body.to_lowercase().contains("expired"));
        assert_eq!(h.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_is_rejected() {
        let h = harness().await;
        let token = TokenIssuer::new(SECRET).issue(&h.identity).unwrap();
        h.repo.delete(h.identity.id).await.unwrap();

        let response = h
            .app
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(h.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_extractor_without_gate_rejects() {
        let (mut parts, _) = request(None).into_parts();
        let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingCredential)));
    }

    #[test]
    fn test_ensure_owner_is_case_insensitive() {
        let user = AuthenticatedUser::new(Identity {
            id: uuid::Uuid::new_v4(),
            username: "alice123".to_string(),
            password_hash: String::new(),
            email: "alice@example.com".to_string(),
            birthday: None,
            favorite_movies: vec![],
        });

        assert!(user.ensure_owner("ALICE123").is_ok());
        assert!(matches!(user.ensure_owner("bobby123"), Err(ApiError::Forbidden(_))));
    }
}
