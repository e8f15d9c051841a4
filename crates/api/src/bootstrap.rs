//! Process setup shared by the `api`, `worker` and `build` binaries.

use infra::Db;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::DatabaseConfig;

/// Install the global subscriber (`RUST_LOG`, default `info`) and load `.env`.
pub fn init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
}

/// Connect to Postgres and apply pending migrations unless `SKIP_MIGRATIONS` is set.
pub async fn connect_db(config: &DatabaseConfig) -> anyhow::Result<Db> {
    let pool = infra::db::connect(&config.url, config.max_connections).await?;
    info!(
        "Connected to Postgres with max {} connections",
        config.max_connections
    );

    if config.skip_migrations {
        info!("Skipping database migrations (SKIP_MIGRATIONS=true)");
    } else {
        info!("Running database migrations...");
        infra::db::migrate(&pool).await?;
        info!("Database migrations completed successfully");
    }

    Ok(pool)
}
