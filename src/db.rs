use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::time::Duration;

/// Type alias for the PostgreSQL connection pool
pub type DbPool = PgPool;

/// Errors surfaced by the identity and movie repositories
///
/// `DuplicateUsername` is a domain outcome of an atomic insert/update.
/// Everything else is an infrastructure fault and is treated as retryable.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("repository call timed out after {0:?}")]
    Timeout(Duration),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Creates and configures a PostgreSQL connection pool
///
/// # Arguments
/// * `database_url` - PostgreSQL connection string
/// * `max_connections` - Upper bound on pooled connections
/// * `acquire_timeout` - How long a caller may wait for a free connection
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<DbPool, sqlx::Error> {
    tracing::debug!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Runs a repository call with an upper bound on its duration
///
/// A call that does not finish in time resolves to `RepositoryError::Timeout`;
/// the inner future is dropped.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!("Repository call exceeded {:?}", limit);
            Err(RepositoryError::Timeout(limit))
        }
    }
}

/// Maps a unique-constraint violation on the username index to a domain error
pub fn map_unique_violation(error: sqlx::Error, username: &str) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &error {
        if db_err.is_unique_violation() {
            return RepositoryError::DuplicateUsername(username.to_string());
        }
    }
    RepositoryError::Database(error)
}
