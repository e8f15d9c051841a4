use axum::{extract::State, response::Html};

use crate::error::AppError;
use crate::routes::views;
use crate::state::AppState;

/// GET /
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let clubs = state.clubs().list().await?;
    Ok(views::home_page(state.labels(), &clubs))
}
