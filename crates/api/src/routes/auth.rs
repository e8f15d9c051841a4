use axum::{
    extract::{Form, State},
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect, Response},
};
use infra::StoreError;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::accounts::{self, AccountError};
use crate::auth::cookie::{build_clear_cookie, build_session_cookie};
use crate::error::AppError;
use crate::middleware::Session;
use crate::routes::views;
use crate::state::AppState;

pub const LOGIN_FAILED: &str = "Login fehlgeschlagen. Bitte pruefe deine Daten.";
pub const EMAIL_TAKEN: &str = "Diese E-Mail ist bereits registriert.";
pub const PASSWORD_TOO_SHORT: &str = "Passwort ist zu kurz.";
pub const REGISTRATION_FAILED: &str = "Registrierung fehlgeschlagen.";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

/// GET /login
pub async fn login_form(State(state): State<AppState>, session: Option<Session>) -> Response {
    if session.is_some() {
        return Redirect::to("/admin").into_response();
    }
    views::login_page(state.labels(), None, "").into_response()
}

/// GET /register
pub async fn register_form(State(state): State<AppState>, session: Option<Session>) -> Response {
    if session.is_some() {
        return Redirect::to("/admin").into_response();
    }
    views::register_page(state.labels(), None, "").into_response()
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim();

    match accounts::authenticate(&state.users(), email, &form.password).await {
        Ok(user) => {
            info!(user_id = %user.id, "user logged in");
            start_session(&state, user.id, user.email)
        }
        Err(err) => {
            if !matches!(err, AccountError::InvalidCredentials) {
                error!(error = %err, "login failed");
            }
            Ok(views::login_page(state.labels(), Some(LOGIN_FAILED), email).into_response())
        }
    }
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim();
    let min_length = state.auth_config().password_min_length;

    match accounts::register(&state.users(), email, &form.password, min_length).await {
        Ok(user) => start_session(&state, user.id, user.email),
        Err(err) => {
            let message = registration_message(&err);
            if message == REGISTRATION_FAILED {
                error!(error = %err, "registration failed");
            }
            Ok(views::register_page(state.labels(), Some(message), email).into_response())
        }
    }
}

/// POST /logout
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = build_clear_cookie(state.auth_config().cookie_secure);
    ([(SET_COOKIE, cookie)], Redirect::to("/login")).into_response()
}

fn registration_message(err: &AccountError) -> &'static str {
    match err {
        AccountError::Store(StoreError::EmailExists) => EMAIL_TAKEN,
        AccountError::PasswordTooShort => PASSWORD_TOO_SHORT,
        _ => REGISTRATION_FAILED,
    }
}

fn start_session(state: &AppState, user_id: Uuid, email: String) -> Result<Response, AppError> {
    let config = state.auth_config();
    let token = state.jwt_service().create_token(user_id, email)?;
    let cookie = build_session_cookie(&token, config.session_ttl_secs(), config.cookie_secure);
    Ok(([(SET_COOKIE, cookie)], Redirect::to("/admin")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_errors_map_to_messages() {
        assert_eq!(
            registration_message(&AccountError::Store(StoreError::EmailExists)),
            EMAIL_TAKEN
        );
        assert_eq!(
            registration_message(&AccountError::PasswordTooShort),
            PASSWORD_TOO_SHORT
        );
        assert_eq!(
            registration_message(&AccountError::Store(StoreError::EmailRequired)),
            REGISTRATION_FAILED
        );
    }
}
