use std::net::SocketAddr;

use tokio::net::TcpListener;

use api::app::build_router;
use api::auth::AuthConfig;
use api::bootstrap;
use api::config::{DatabaseConfig, ServerConfig, SiteConfig};
use api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bootstrap::init();

    let database = DatabaseConfig::from_env()?;
    let server = ServerConfig::from_env();
    let site = SiteConfig::from_env();
    let auth = AuthConfig::from_env()?;

    let pool = bootstrap::connect_db(&database).await?;
    let state = AppState::new(pool, auth, &server, site);
    let app = build_router(state)?;

    let addr = format!("0.0.0.0:{}", server.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(build_debounce = ?server.build_debounce, "Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
