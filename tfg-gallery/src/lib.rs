//! tfg-gallery library - album gallery web service
//!
//! Serves the embedded single-page UI and the JSON/SSE API behind the two
//! password gates.

use std::sync::Arc;

use axum::Router;
use tfg_common::gate::{GateSecrets, SessionRegistry};
use tfg_common::AlbumSync;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cli;
pub mod error;
pub mod server;

pub use error::ApiError;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Store access, snapshot cache and event bus
    pub sync: Arc<AlbumSync>,
    /// Gate state per browser session
    pub sessions: Arc<SessionRegistry>,
    pub secrets: GateSecrets,
    /// Held for the duration of a bulk replace
    pub import_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(sync: Arc<AlbumSync>, secrets: GateSecrets) -> Self {
        Self {
            sync,
            sessions: Arc::new(SessionRegistry::new()),
            secrets,
            import_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Build application router
///
/// Static UI, health and session routes are open; the gallery routes need
/// the site gate and the editing routes need both gates.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    let admin = Router::new()
        .route("/api/import", post(api::import_albums))
        .route("/api/import/progress", get(api::import_progress))
        .route("/api/export", get(api::export_albums))
        .route("/api/albums", post(api::add_album))
        .route(
            "/api/albums/:id",
            put(api::update_album).delete(api::delete_album),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_admin,
        ));

    let site = Router::new()
        .route("/api/albums", get(api::list_albums))
        .route("/api/events", get(api::event_stream))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_site,
        ));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .merge(api::session_routes());

    Router::new()
        .merge(admin)
        .merge(site)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
