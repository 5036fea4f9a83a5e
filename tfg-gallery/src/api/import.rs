//! CSV bulk replace, its progress, and CSV export

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tfg_common::csv_import::{check_import_file_name, export_csv, parse_csv_document};
use tfg_common::events::ReplaceProgress;
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    /// Name of the uploaded file, checked for an accepted extension
    ///
    /// Required; optional here only so a missing value gets our own 400.
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub deleted: usize,
    pub delete_phase_error: Option<String>,
    pub message: String,
}

/// POST /api/import?filename=albums.csv
///
/// The body is the file text. Every existing album is deleted and the parsed
/// rows are inserted, in batches, while progress goes out on the event
/// stream. Nothing is written when the file is rejected or yields no rows.
pub async fn import_albums(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> ApiResult<Json<ImportResponse>> {
    let filename = query.filename.as_deref().ok_or_else(|| {
        ApiError::BadRequest("filename query parameter is required".to_string())
    })?;
    check_import_file_name(filename)?;
    let records = parse_csv_document(&body)?;
    let guard = state
        .import_lock
        .clone()
        .try_lock_owned()
        .map_err(|_| ApiError::Conflict("an import is already running".to_string()))?;
    info!("Importing {} albums from {}", records.len(), filename);

    // The replace keeps running even if the uploader goes away
    let sync = state.sync.clone();
    let task = tokio::spawn(async move {
        let _guard = guard;
        sync.replace_all(records).await
    });
    let report = task.await.map_err(|e| {
        error!("Import task failed: {}", e);
        ApiError::Internal(format!("Import task failed: {}", e))
    })??;

    Ok(Json(ImportResponse {
        imported: report.inserted,
        deleted: report.deleted,
        message: format!("成功匯入 {} 筆資料！", report.inserted),
        delete_phase_error: report.delete_phase_error,
    }))
}

/// GET /api/import/progress
///
/// Latest progress of the running or last finished replace, `null` if none
/// has run since startup.
pub async fn import_progress(State(state): State<AppState>) -> Json<Option<ReplaceProgress>> {
    Json(state.sync.latest_progress().await)
}

/// GET /api/export
///
/// Stored albums only; seed data is never exported.
pub async fn export_albums(State(state): State<AppState>) -> ApiResult<Response> {
    let albums = state.sync.snapshot().await?;
    let csv = export_csv(&albums)?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"albums.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
