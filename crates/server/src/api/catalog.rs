//! Catalog API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use filmzi_core::{CatalogEntry, CatalogStats};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ErrorResponse;
use crate::state::AppState;

/// Maximum allowed limit for recent entries
const MAX_LIMIT: u32 = 100;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    10
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub catalog: CatalogStats,
    pub total_users: u64,
}

#[derive(Debug, Serialize)]
pub struct EntryListResponse {
    pub entries: Vec<CatalogEntry>,
    pub total: usize,
}

fn internal(error: impl ToString) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(error.to_string())),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/catalog/stats
///
/// Catalog statistics plus the number of known users.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, ApiError> {
    let catalog = state.catalog().stats().map_err(internal)?;
    let total_users = state.users().count().map_err(internal)?;

    Ok(Json(StatsResponse {
        catalog,
        total_users,
    }))
}

/// GET /api/v1/catalog/recent?limit=
///
/// Most recently indexed entries, newest first.
pub async fn list_recent(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecentParams>,
) -> Result<Json<EntryListResponse>, ApiError> {
    let entries = state
        .catalog()
        .recent(params.limit.min(MAX_LIMIT))
        .map_err(internal)?;
    let total = entries.len();

    Ok(Json(EntryListResponse { entries, total }))
}

/// GET /api/v1/catalog/{id}
///
/// Full details of one entry.
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<CatalogEntry>, ApiError> {
    match state.search().get_by_id(id) {
        Some(entry) => Ok(Json(entry)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("Entry not found: {}", id))),
        )),
    }
}

/// GET /api/v1/catalog/titles/{title}
///
/// Every indexed quality of a title, lowest first.
pub async fn get_qualities(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
) -> Json<EntryListResponse> {
    let entries = state.search().all_qualities(&title);
    if entries.is_empty() {
        debug!(title, "No entries for title");
    }
    let total = entries.len();

    Json(EntryListResponse { entries, total })
}
