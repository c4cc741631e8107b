//! Login endpoints; reachable without a session
//!
//! POST /auth/login    - exchange the admin password for a session cookie
//! POST /auth/logout   - clear the session cookie
//! GET  /auth/session  - report whether the caller holds a valid session

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use panel_kernel::gateway::GatewayError;
use panel_kernel::session::SESSION_COOKIE;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::json_body;
use crate::error::{PanelError, PanelResult};
use crate::session::{clear_cookie, extract_cookie, session_cookie};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub password: Option<String>,
}

/// Session state as reported to the browser.
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> PanelResult<impl IntoResponse> {
    if !state.verifier.is_configured() {
        warn!("login attempted but ADMIN_PASSWORD is not set");
        return Err(GatewayError::MissingAdminPassword("ADMIN_PASSWORD").into());
    }

    let password = json_body(body)?
        .password
        .ok_or_else(|| PanelError::Validation("Password is required".to_string()))?;
    if !state.verifier.verify(&password) {
        warn!("login rejected: invalid password");
        return Err(PanelError::InvalidPassword);
    }

    let token = state.sessions.issue(Utc::now());
    info!(expires_at = %token.expires_at, "session issued");
    Ok((
        [(header::SET_COOKIE, session_cookie(&token.value, state.cookie_secure))],
        Json(SessionStatus {
            authenticated: true,
            expires_at: Some(token.expires_at),
        }),
    ))
}

/// POST /auth/logout
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_cookie(state.cookie_secure))],
        Json(SessionStatus {
            authenticated: false,
            expires_at: None,
        }),
    )
}

/// GET /auth/session
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let cookies = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");
    let claims = extract_cookie(&cookies, SESSION_COOKIE)
        .and_then(|token| state.sessions.verify(token, Utc::now()).ok());

    Json(SessionStatus {
        authenticated: claims.is_some(),
        expires_at: claims.and_then(|c| c.expires_at),
    })
}

/// Build the auth router sub-tree
pub fn auth_router() -> axum::Router<AppState> {
    use axum::routing::{get, post};
    axum::Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(session))
}
