use std::sync::Arc;

use myflix_api::{
    auth::{InMemoryIdentityRepository, PgIdentityRepository},
    config::Settings,
    create_router, db,
    movies::{InMemoryMovieRepository, PgMovieRepository},
    telemetry, AppState,
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    telemetry::init_tracing();
    tracing::info!("MyFlix API - Starting...");

    let settings = Settings::from_env().expect("Failed to load configuration");

    let state = match &settings.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(
                database_url,
                settings.database_max_connections,
                settings.repository_timeout,
            )
            .await
            .expect("Failed to create database pool");

            // Run SQLx migrations on startup
            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Migrations completed successfully");

            AppState::new(
                &settings.jwt_secret,
                Arc::new(PgIdentityRepository::new(pool.clone(), settings.repository_timeout)),
                Arc::new(PgMovieRepository::new(pool, settings.repository_timeout)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores, data is lost on exit");
            AppState::new(
                &settings.jwt_secret,
                Arc::new(InMemoryIdentityRepository::new()),
                Arc::new(InMemoryMovieRepository::new()),
            )
        }
    }
    .expect("Failed to initialize authentication");

    let app = create_router(state);

    let addr = settings.address();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("MyFlix API is running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
