use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::middleware::{require_session, session_middleware};
use crate::routes::{admin, auth, public};
use crate::state::AppState;

/// Build the Axum router: public pages, auth forms, the admin area and the
/// generated site under `/clubs` and `/assets`.
///
/// Login and register POSTs are rate limited per peer IP, so the router must
/// be served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // Rate limiting: 10 requests per minute per IP on auth endpoints
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(6) // 1 token every 6 seconds = ~10/min
        .burst_size(10)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit configuration"))?;

    let rate_limited_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .layer(GovernorLayer::new(Arc::new(governor_conf)));

    let admin_routes = Router::new()
        .route("/admin", get(admin::dashboard))
        .route("/admin/club", post(admin::save_club))
        .route("/admin/build", get(admin::build_status))
        .route_layer(middleware::from_fn(require_session));

    let output_dir = state.site().output_dir.clone();

    Ok(Router::new()
        // Simple liveness check; also proves DB connectivity.
        .route("/health", get(health))
        .route("/", get(public::home))
        .route("/login", get(auth::login_form))
        .route("/register", get(auth::register_form))
        .route("/logout", post(auth::logout))
        .merge(rate_limited_routes)
        .merge(admin_routes)
        // Generated static site
        .nest_service("/clubs", ServeDir::new(output_dir.join("clubs")))
        .nest_service("/assets", ServeDir::new(output_dir.join("assets")))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, session_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        )))
}

/// Liveness + quick DB probe.
async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let _one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&state.db).await?;
    Ok(Json(json!({ "status": "ok" })))
}
