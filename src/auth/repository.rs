// Identity repository: the storage seam of the auth core

use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::models::{Identity, IdentityChanges, NewIdentity};
use crate::db::{map_unique_violation, with_timeout, RepositoryError};

/// Storage operations the auth core and the account routes depend on
///
/// Every method is a single atomic call against the store. Username
/// uniqueness is case-insensitive and enforced by `create` and `update`
/// themselves, never by a preceding lookup.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Find by username, case-insensitive exact match
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, RepositoryError>;

    /// Insert if no identity holds the username; `DuplicateUsername` otherwise
    async fn create(&self, new_identity: NewIdentity) -> Result<Identity, RepositoryError>;

    /// Apply the present fields; `Ok(None)` when the id is unknown
    async fn update(&self, id: Uuid, changes: IdentityChanges) -> Result<Option<Identity>, RepositoryError>;

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;

    async fn list(&self) -> Result<Vec<Identity>, RepositoryError>;

    /// Append a movie id unless already present
    async fn add_favorite(&self, id: Uuid, movie_id: Uuid) -> Result<Option<Identity>, RepositoryError>;

    async fn remove_favorite(&self, id: Uuid, movie_id: Uuid) -> Result<Option<Identity>, RepositoryError>;
}

const IDENTITY_COLUMNS: &str = "id, username, password_hash, email, birthday, favorite_movies";

/// Postgres-backed identity repository
///
/// Uniqueness comes from the `users_username_lower_idx` unique index, so
/// concurrent registrations race inside the database, not in this process.
#[derive(Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgIdentityRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl IdentityRepository for PgIdentityRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, RepositoryError> {
        let query = format!("SELECT {IDENTITY_COLUMNS} FROM users WHERE LOWER(username) = LOWER($1)");
        with_timeout(self.timeout, async {
            let identity = sqlx::query_as::<_, Identity>(&query)
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
            Ok(identity)
        })
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, RepositoryError> {
        let query = format!("SELECT {IDENTITY_COLUMNS} FROM users WHERE id = $1");
        with_timeout(self.timeout, async {
            let identity = sqlx::query_as::<_, Identity>(&query)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(identity)
        })
        .await
    }

    async fn create(&self, new_identity: NewIdentity) -> Result<Identity, RepositoryError> {
        let query = format!(
            "INSERT INTO users (id, username, password_hash, email, birthday) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {IDENTITY_COLUMNS}"
        );
        with_timeout(self.timeout, async {
            sqlx::query_as::<_, Identity>(&query)
                .bind(Uuid::new_v4())
                .bind(&new_identity.username)
                .bind(&new_identity.password_hash)
                .bind(&new_identity.email)
                .bind(new_identity.birthday)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| map_unique_violation(e, &new_identity.username))
        })
        .await
    }

    async fn update(&self, id: Uuid, changes: IdentityChanges) -> Result<Option<Identity>, RepositoryError> {
        let query = format!(
            "UPDATE users SET \
                username = COALESCE($2, username), \
                password_hash = COALESCE($3, password_hash), \
                email = COALESCE($4, email), \
                birthday = COALESCE($5, birthday) \
             WHERE id = $1 RETURNING {IDENTITY_COLUMNS}"
        );
        let username = changes.username.clone().unwrap_or_default();
        with_timeout(self.timeout, async {
            sqlx::query_as::<_, Identity>(&query)
                .bind(id)
                .bind(changes.username)
                .bind(changes.password_hash)
                .bind(changes.email)
                .bind(changes.birthday)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_unique_violation(e, &username))
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        with_timeout(self.timeout, async {
            let result = sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Identity>, RepositoryError> {
        let query = format!("SELECT {IDENTITY_COLUMNS} FROM users ORDER BY username");
        with_timeout(self.timeout, async {
            let identities = sqlx::query_as::<_, Identity>(&query)
                .fetch_all(&self.pool)
                .await?;
            Ok(identities)
        })
        .await
    }

    async fn add_favorite(&self, id: Uuid, movie_id: Uuid) -> Result<Option<Identity>, RepositoryError> {
        let query = format!(
            "UPDATE users SET favorite_movies = CASE \
                WHEN $2 = ANY(favorite_movies) THEN favorite_movies \
                ELSE array_append(favorite_movies, $2) END \
             WHERE id = $1 RETURNING {IDENTITY_COLUMNS}"
        );
        with_timeout(self.timeout, async {
            let identity = sqlx::query_as::<_, Identity>(&query)
                .bind(id)
                .bind(movie_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(identity)
        })
        .await
    }

    async fn remove_favorite(&self, id: Uuid, movie_id: Uuid) -> Result<Option<Identity>, RepositoryError> {
        let query = format!(
            "UPDATE users SET favorite_movies = array_remove(favorite_movies, $2) \
             WHERE id = $1 RETURNING {IDENTITY_COLUMNS}"
        );
        with_timeout(self.timeout, async {
            let identity = sqlx::query_as::<_, Identity>(&query)
                .bind(id)
                .bind(movie_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(identity)
        })
        .await
    }
}
