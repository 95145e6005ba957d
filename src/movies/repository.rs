// Movie repository: storage seam of the catalog

use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::db::{with_timeout, RepositoryError};
use crate::movies::models::{Director, Genre, Movie, MovieRow};

/// Read-only catalog lookups
///
/// Title, genre and director lookups are exact and case-insensitive.
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// All movies ordered by title
    async fn list(&self) -> Result<Vec<Movie>, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>, RepositoryError>;

    /// Movies for the given ids, in the order of `ids`; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Movie>, RepositoryError>;

    async fn find_by_title(&self, title: &str) -> Result<Option<Movie>, RepositoryError>;

    /// Genre embedded in the first movie (by title) that carries it
    async fn find_genre(&self, name: &str) -> Result<Option<Genre>, RepositoryError>;

    /// Director embedded in the first movie (by title) that carries them
    async fn find_director(&self, name: &str) -> Result<Option<Director>, RepositoryError>;
}

const MOVIE_COLUMNS: &str = "id, title, description, genre_name, genre_description, \
     director_name, director_bio, actors, image_path, featured, backdrop_image";

/// Postgres-backed movie repository
#[derive(Clone)]
pub struct PgMovieRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgMovieRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl MovieRepository for PgMovieRepository {
    async fn list(&self) -> Result<Vec<Movie>, RepositoryError> {
        let query = format!("SELECT {MOVIE_COLUMNS} FROM movies ORDER BY title");
        with_timeout(self.timeout, async {
            let rows = sqlx::query_as::<_, MovieRow>(&query)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows.into_iter().map(Movie::from).collect())
        })
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>, RepositoryError> {
        let query = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1");
        with_timeout(self.timeout, async {
            let row = sqlx::query_as::<_, MovieRow>(&query)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row.map(Movie::from))
        })
        .await
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Movie>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ANY($1) ORDER BY array_position($1, id)"
        );
        with_timeout(self.timeout, async {
            let rows = sqlx::query_as::<_, MovieRow>(&query)
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows.into_iter().map(Movie::from).collect())
        })
        .await
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Movie>, RepositoryError> {
        let query = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE LOWER(title) = LOWER($1) ORDER BY title LIMIT 1"
        );
        with_timeout(self.timeout, async {
            let row = sqlx::query_as::<_, MovieRow>(&query)
                .bind(title)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row.map(Movie::from))
        })
        .await
    }

    async fn find_genre(&self, name: &str) -> Result<Option<Genre>, RepositoryError> {
        with_timeout(self.timeout, async {
            let genre = sqlx::query_as::<_, Genre>(
                r#"
                SELECT genre_name AS name, genre_description AS description
                FROM movies
                WHERE LOWER(genre_name) = LOWER($1)
                ORDER BY title
                LIMIT 1
                "#,
            )
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
            Ok(genre)
        })
        .await
    }

    async fn find_director(&self, name: &str) -> Result<Option<Director>, RepositoryError> {
        with_timeout(self.timeout, async {
            let director = sqlx::query_as::<_, Director>(
                r#"
                SELECT director_name AS name, director_bio AS bio
                FROM movies
                WHERE LOWER(director_name) = LOWER($1)
                ORDER BY title
                LIMIT 1
                "#,
            )
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
            Ok(director)
        })
        .await
    }
}
