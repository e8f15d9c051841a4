use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{header::COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;
use uuid::Uuid;

use crate::auth::cookie::extract_session_token;
use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;

/// Claims of the logged-in user, as put in place by [`session_middleware`].
#[derive(Debug, Clone)]
pub struct Session(pub Claims);

impl Session {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        self.0.user_id()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(Session)
            .ok_or_else(|| Redirect::to("/login"))
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Claims>().cloned().map(Session))
    }
}

/// Decode the session cookie and add its claims to the request extensions.
///
/// A missing or invalid cookie leaves the request anonymous.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(extract_session_token);

    if let Some(token) = token {
        match state.jwt_service().verify_token(&token) {
            Ok(claims) => {
                request.extensions_mut().insert::<Claims>(claims);
            }
            Err(err) => debug!(error = %err, "ignoring invalid session cookie"),
        }
    }

    next.run(request).await
}

/// Send anonymous requests to the login page.
pub async fn require_session(request: Request, next: Next) -> Response {
    if request.extensions().get::<Claims>().is_none() {
        return Redirect::to("/login").into_response();
    }
    next.run(request).await
}
