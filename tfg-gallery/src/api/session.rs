//! Session routes and gate middleware
//!
//! A session is opened when the page loads and its token is kept in page
//! memory. Every gated request carries the token in the `X-Gallery-Session`
//! header, or in the `session` query parameter where headers cannot be set
//! (EventSource).

use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tfg_common::gate::{GateError, GateKind, GateState, Session};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const SESSION_HEADER: &str = "x-gallery-session";

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub gate: GateKind,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub site: GateState,
    pub admin: GateState,
}

impl From<Session> for SessionStatus {
    fn from(session: Session) -> Self {
        Self {
            site: session.site.state(),
            admin: session.admin.state(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OpenedSession {
    pub token: String,
    #[serde(flatten)]
    pub status: SessionStatus,
}

/// Header first, then the `session` query parameter
pub fn session_token(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    if let Some(value) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(value.to_string());
    }
    Query::<SessionQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(q)| q.session)
        .filter(|token| !token.is_empty())
}

async fn current_session(state: &AppState, headers: &HeaderMap, uri: &Uri) -> ApiResult<(String, Session)> {
    let token = session_token(headers, uri)
        .ok_or_else(|| ApiError::Locked("missing session token".to_string()))?;
    let session = state
        .sessions
        .get(&token)
        .await
        .ok_or(GateError::UnknownSession)?;
    Ok((token, session))
}

/// POST /api/session
///
/// Opens a session with both gates locked.
pub async fn open_session(State(state): State<AppState>) -> impl IntoResponse {
    let token = state.sessions.open().await;
    let session = Session::default();
    (
        StatusCode::CREATED,
        Json(OpenedSession {
            token,
            status: session.into(),
        }),
    )
}

/// GET /api/session
pub async fn session_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<Json<SessionStatus>> {
    let (_, session) = current_session(&state, &headers, &uri).await?;
    Ok(Json(session.into()))
}

/// POST /api/session/unlock
///
/// The admin gate is only offered once the site gate is open.
pub async fn unlock_gate(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Json(request): Json<UnlockRequest>,
) -> ApiResult<Json<SessionStatus>> {
    let (token, session) = current_session(&state, &headers, &uri).await?;
    if request.gate == GateKind::Admin && !session.site.is_unlocked() {
        return Err(ApiError::Locked("site gate is locked".to_string()));
    }

    let session = state
        .sessions
        .unlock(&token, request.gate, &request.password, &state.secrets)
        .await
        .inspect_err(|e| {
            if matches!(e, GateError::WrongPassword { .. }) {
                warn!("Wrong password for {} gate", request.gate);
            }
        })?;
    Ok(Json(session.into()))
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/session", post(open_session).get(session_status))
        .route("/api/session/unlock", post(unlock_gate))
}

async fn check_gates(
    state: &AppState,
    headers: &HeaderMap,
    uri: &Uri,
    gates: &[GateKind],
) -> ApiResult<()> {
    let (_, session) = current_session(state, headers, uri).await?;
    for kind in gates {
        if !session.gate(*kind).is_unlocked() {
            info!("Rejected {}: {} gate locked", uri.path(), kind);
            return Err(ApiError::Locked(format!("{} gate is locked", kind)));
        }
    }
    Ok(())
}

/// Gallery routes: the site gate must be open
pub async fn require_site(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    check_gates(&state, &parts.headers, &parts.uri, &[GateKind::Site]).await?;
    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Editing routes: both gates must be open
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    check_gates(
        &state,
        &parts.headers,
        &parts.uri,
        &[GateKind::Site, GateKind::Admin],
    )
    .await?;
    Ok(next.run(Request::from_parts(parts, body)).await)
}
