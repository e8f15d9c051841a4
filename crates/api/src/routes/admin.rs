use axum::{
    extract::{Form, Query, State},
    response::{IntoResponse, Json, Redirect, Response},
};
use infra::{BuildTaskRow, StoreError};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::middleware::Session;
use crate::routes::forms::ClubForm;
use crate::routes::views::{self, Dashboard};
use crate::state::AppState;

pub const SAVED: &str = "Club gespeichert.";
pub const NAME_REQUIRED: &str = "Bitte einen Clubnamen angeben.";
pub const SAVE_FAILED: &str = "Speichern fehlgeschlagen.";

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub saved: Option<String>,
}

/// GET /admin
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError> {
    let club = state.clubs().get_by_owner(session.user_id()?).await?;
    let form = ClubForm::from_club(club.as_ref());
    let info = (query.saved.as_deref() == Some("1")).then_some(SAVED);

    let page = views::dashboard_page(
        state.labels(),
        &Dashboard {
            form: &form,
            error: None,
            info,
            slug: club.as_ref().map(|club| club.slug()),
        },
    );
    Ok(page.into_response())
}

/// POST /admin/club
///
/// Saves the profile, then asks for a debounced site rebuild. A failed
/// enqueue is logged but does not fail the save.
pub async fn save_club(
    State(state): State<AppState>,
    session: Session,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let owner_id = session.user_id()?;
    let form = ClubForm::from_pairs(&pairs);
    let clubs = state.clubs();

    let saved = clubs
        .save_profile(
            owner_id,
            &form.club,
            &form.opening_inputs(),
            &form.course_inputs(),
        )
        .await;

    match saved {
        Ok(club) => {
            info!(club_id = %club.id(), slug = %club.slug(), "club saved");
            if let Err(err) = state.build_queue().enqueue(state.build_debounce()).await {
                warn!(error = %err, "failed to enqueue build task");
            }
            Ok(Redirect::to("/admin?saved=1").into_response())
        }
        Err(err) => {
            let message = match err {
                StoreError::NameRequired => NAME_REQUIRED,
                ref other => {
                    error!(error = %other, "saving club failed");
                    SAVE_FAILED
                }
            };
            let existing = clubs.get_by_owner(owner_id).await.ok().flatten();
            let page = views::dashboard_page(
                state.labels(),
                &Dashboard {
                    form: &form,
                    error: Some(message),
                    info: None,
                    slug: existing.as_ref().map(|club| club.slug()),
                },
            );
            Ok(page.into_response())
        }
    }
}

/// GET /admin/build: current state of the site build task.
pub async fn build_status(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<Option<BuildTaskRow>>, AppError> {
    Ok(Json(state.build_queue().current().await?))
}
