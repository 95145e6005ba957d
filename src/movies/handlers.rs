// HTTP handlers for the movie catalog

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::ApiError;
use crate::movies::models::{Director, Genre, Movie};
use crate::AppState;

/// Handler for GET /movies
pub async fn list_movies(State(state): State<AppState>) -> Result<Json<Vec<Movie>>, ApiError> {
    let movies = state.movies.list().await?;
    tracing::debug!("Retrieved {} movies", movies.len());
    Ok(Json(movies))
}

/// Handler for GET /movies/:title
pub async fn get_movie_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Movie>, ApiError> {
    let movie = state
        .movies
        .find_by_title(&title)
        .await?
        .ok_or_else(|| ApiError::not_found("Movie", &title))?;
    Ok(Json(movie))
}

/// Handler for GET /movies/genres/:name
pub async fn get_genre(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Genre>, ApiError> {
    let genre = state
        .movies
        .find_genre(&name)
        .await?
        .ok_or_else(|| ApiError::not_found("Genre", &name))?;
    Ok(Json(genre))
}

/// Handler for GET /movies/directors/:name
pub async fn get_director(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Director>, ApiError> {
    let director = state
        .movies
        .find_director(&name)
        .await?
        .ok_or_else(|| ApiError::not_found("Director", &name))?;
    Ok(Json(director))
}
