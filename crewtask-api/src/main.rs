//! # Crewtask API Server
//!
//! Team task management API: registration and sessions, teams with
//! role-based membership, and tasks scoped to teams.
//!
//! ## Architecture
//!
//! The server is built with Axum on top of PostgreSQL (data) and redis
//! (sessions). Resources are created once here and injected through
//! `AppState`; shutdown closes them explicitly.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p crewtask-api
//! ```

use crewtask_api::{
    app::{build_router, AppState},
    config::Config,
};
use crewtask_shared::{
    auth::session::SessionStore,
    db::{migrations, pool},
    redis::client::{RedisClient, RedisConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crewtask_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Crewtask API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database pool and run migrations
    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    // Initialize the redis-backed session store
    let redis = RedisClient::new(RedisConfig {
        url: config.session.redis_url.clone(),
        connection_timeout_secs: 5,
        command_timeout_secs: 10,
    })
    .await?;
    let sessions = SessionStore::new(redis, config.session.ttl_secs);

    // Build the application
    let bind_address = config.bind_address();
    let state = AppState::new(db.clone(), sessions, config);
    let app = build_router(state);

    // Start the server with graceful shutdown on ctrl-c
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting...");
        })
        .await?;

    // Release process-wide resources explicitly
    pool::close_pool(db).await;

    Ok(())
}
