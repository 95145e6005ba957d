// MyFlix API: movie catalog and user accounts behind JWT authentication

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod movies;
pub mod telemetry;
pub mod users;
pub mod validation;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use auth::{
    AuthError, AuthService, CredentialVerifier, IdentityRepository, TokenIssuer, TokenValidator,
};
use movies::MovieRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub identities: Arc<dyn IdentityRepository>,
    pub movies: Arc<dyn MovieRepository>,
    pub auth: Arc<AuthService>,
    pub validator: Arc<TokenValidator>,
}

impl AppState {
    /// Wire the auth core around the given repositories
    ///
    /// The secret is only held by the issuer and validator keys.
    pub fn new(
        jwt_secret: &str,
        identities: Arc<dyn IdentityRepository>,
        movies: Arc<dyn MovieRepository>,
    ) -> Result<Self, AuthError> {
        let verifier = CredentialVerifier::new(identities.clone())?;
        let auth = AuthService::new(identities.clone(), verifier, TokenIssuer::new(jwt_secret));
        let validator = TokenValidator::new(jwt_secret, identities.clone());

        Ok(Self {
            identities,
            movies,
            auth: Arc::new(auth),
            validator: Arc::new(validator),
        })
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

async fn welcome() -> &'static str {
    "Welcome to MyFlix!"
}

/// Creates and configures the application router
///
/// Everything except `/`, `/login` and registration sits behind the gate.
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(welcome))
        .route("/login", post(auth::login_handler))
        .route("/users", post(users::handlers::register_user));

    let protected = Router::new()
        .route("/users", get(users::handlers::list_users))
        .route(
            "/users/:username",
            get(users::handlers::get_user)
                .put(users::handlers::update_user)
                .delete(users::handlers::delete_user),
        )
        .route("/users/:username/favorites", get(users::handlers::list_favorites))
        .route(
            "/users/:username/movies/:movie_id",
            post(users::handlers::add_favorite).delete(users::handlers::remove_favorite),
        )
        .route("/verify-password", post(users::handlers::verify_password))
        .route("/movies", get(movies::handlers::list_movies))
        .route("/movies/:title", get(movies::handlers::get_movie_by_title))
        .route("/movies/genres/:name", get(movies::handlers::get_genre))
        .route("/movies/directors/:name", get(movies::handlers::get_director))
        .route_layer(middleware::from_fn_with_state(
            state.validator.clone(),
            auth::require_auth,
        ));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
