use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trend_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{PostgresRepository, RepositoryState},
};

/// main
///
/// Asynchronous entry point: configuration, logging, database pool and the
/// HTTP server, initialized in that order.
#[tokio::main]
async fn main() {
    // Load .env before configuration is read. AppConfig::load() fails fast on
    // missing production secrets.
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // RUST_LOG wins; otherwise sensible local-development defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "trend_portal=debug,tower_http=info,axum=trace".into());

    // Pretty output for humans locally, JSON for log aggregators in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // Bounded pool with an explicit acquire timeout, and a server-side
    // statement timeout on every connection so a runaway query cannot pin a
    // pool slot indefinitely.
    let connect_options = PgConnectOptions::from_str(&config.db_url)
        .expect("FATAL: DATABASE_URL is not a valid Postgres connection string.")
        .options([("statement_timeout", "5000")]);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(connect_options)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    let app_state = AppState { repo, config };
    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("FATAL: Failed to bind 0.0.0.0:3000");

    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("API docs (Swagger UI) at http://localhost:3000/swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly");
}
