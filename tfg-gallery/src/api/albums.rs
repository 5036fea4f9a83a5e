//! Album list and single-album editing

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tfg_common::album::PlaceholderTone;
use tfg_common::gallery::{extract_categories, filter_and_sort, CategorySelection, SortOrder, ALL_CATEGORIES};
use tfg_common::seed::visible_albums;
use tfg_common::{Album, AlbumRecord};

use crate::error::ApiResult;
use crate::AppState;

/// Album as rendered by a card
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumView {
    #[serde(flatten)]
    pub album: Album,
    pub tags: Vec<String>,
    pub tone: PlaceholderTone,
    pub has_videos: bool,
}

impl From<Album> for AlbumView {
    fn from(album: Album) -> Self {
        Self {
            tags: album.tags(),
            tone: album.tone(),
            has_videos: album.record.has_videos(),
            album,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default = "all_categories")]
    pub category: String,
    #[serde(default)]
    pub order: SortOrder,
}

fn all_categories() -> String {
    ALL_CATEGORIES.to_string()
}

#[derive(Debug, Serialize)]
pub struct AlbumListResponse {
    pub albums: Vec<AlbumView>,
    /// Tags across the whole visible collection, not just the filtered part
    pub categories: Vec<String>,
    /// Size of the visible collection before filtering
    pub total: usize,
    /// True when the store is empty or unreadable and seed data is shown
    pub seeded: bool,
    pub order: SortOrder,
}

/// GET /api/albums?search=&category=All&order=desc
pub async fn list_albums(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<AlbumListResponse> {
    let snapshot = state.sync.albums_for_display().await;
    let (visible, seeded) = visible_albums(&snapshot);

    let selection = CategorySelection::from(query.category.as_str());
    let albums = filter_and_sort(&visible, &query.search, &selection, query.order)
        .into_iter()
        .map(AlbumView::from)
        .collect();

    Json(AlbumListResponse {
        albums,
        categories: extract_categories(&visible),
        total: visible.len(),
        seeded,
        order: query.order,
    })
}

/// POST /api/albums
pub async fn add_album(
    State(state): State<AppState>,
    Json(record): Json<AlbumRecord>,
) -> ApiResult<impl IntoResponse> {
    let album = state.sync.add(record.normalized()).await?;
    Ok((StatusCode::CREATED, Json(AlbumView::from(album))))
}

/// PUT /api/albums/:id
///
/// Overwrites every field; omitted optional fields are cleared.
pub async fn update_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(record): Json<AlbumRecord>,
) -> ApiResult<StatusCode> {
    state.sync.update(&id, record.normalized()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/albums/:id
pub async fn delete_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.sync.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
