// HTTP handlers for account routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthenticatedUser, Identity, RegisterRequest, UserResponse};
use crate::error::ApiError;
use crate::movies::Movie;
use crate::users::models::{
    MessageResponse, UpdateUserRequest, VerifyPasswordRequest, VerifyPasswordResponse,
};
use crate::AppState;

async fn find_user(state: &AppState, username: &str) -> Result<Identity, ApiError> {
    state
        .identities
        .find_by_username(username)
        .await?
        .ok_or_else(|| ApiError::not_found("User", username))
}

/// Handler for POST /users
/// Registers a new account
pub async fn register_user(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    tracing::debug!("Registering user: {}", payload.username);
    payload.validate()?;

    let identity = state.auth.register(payload).await?;
    Ok((StatusCode::CREATED, Json(identity.into())))
}

/// Handler for GET /users
pub async fn list_users(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.identities.list().await?;
    tracing::debug!("Retrieved {} users", users.len());
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Handler for GET /users/:username
pub async fn get_user(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let identity = find_user(&state, &username).await?;
    Ok(Json(identity.into()))
}

/// Handler for PUT /users/:username
/// Partial update of the caller's own profile
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(username): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateUserRequest>, ApiError>,
) -> Result<Json<UserResponse>, ApiError> {
    user.ensure_owner(&username)?;
    payload.validate()?;

    let updated = state
        .auth
        .update_profile(user.identity().id, payload.into())
        .await?
        .ok_or_else(|| ApiError::not_found("User", &username))?;

    tracing::info!("Updated user {} ({})", updated.username, updated.id);
    Ok(Json(updated.into()))
}

/// Handler for DELETE /users/:username
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(username): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.ensure_owner(&username)?;

    if !state.identities.delete(user.identity().id).await? {
        return Err(ApiError::not_found("User", &username));
    }

    tracing::info!("Deleted user {}", user.identity().username);
    Ok(Json(MessageResponse {
        message: format!("{} was deleted.", username),
    }))
}

/// Handler for POST /verify-password
/// Re-checks the caller's password without issuing a token
pub async fn verify_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    WithRejection(Json(payload), _): WithRejection<Json<VerifyPasswordRequest>, ApiError>,
) -> Result<Json<VerifyPasswordResponse>, ApiError> {
    user.ensure_owner(&payload.username)?;

    state
        .auth
        .verify_credentials(&payload.username, &payload.password)
        .await?;
    Ok(Json(VerifyPasswordResponse { success: true }))
}

/// Handler for GET /users/:username/favorites
/// Movies in the order they were favorited
pub async fn list_favorites(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(username): Path<String>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let identity = find_user(&state, &username).await?;
    let movies = state.movies.find_by_ids(&identity.favorite_movies).await?;
    Ok(Json(movies))
}

/// Handler for POST /users/:username/movies/:movie_id
pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    WithRejection(Path((username, movie_id)), _): WithRejection<Path<(String, Uuid)>, ApiError>,
) -> Result<Json<UserResponse>, ApiError> {
    user.ensure_owner(&username)?;

    if state.movies.find_by_id(movie_id).await?.is_none() {
        return Err(ApiError::not_found("Movie", movie_id));
    }

    let updated = state
        .identities
        .add_favorite(user.identity().id, movie_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &username))?;

    tracing::debug!("User {} favorited movie {}", updated.username, movie_id);
    Ok(Json(updated.into()))
}

/// Handler for DELETE /users/:username/movies/:movie_id
/// Removing a movie that is not a favorite is a no-op
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    WithRejection(Path((username, movie_id)), _): WithRejection<Path<(String, Uuid)>, ApiError>,
) -> Result<Json<UserResponse>, ApiError> {
    user.ensure_owner(&username)?;

    let updated = state
        .identities
        .remove_favorite(user.identity().id, movie_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &username))?;

    tracing::debug!("User {} unfavorited movie {}", updated.username, movie_id);
    Ok(Json(updated.into()))
}
