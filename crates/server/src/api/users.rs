//! User registry API handlers.
//!
//! Profile refreshes and search history writes are queued on the
//! [`UserRecorder`](filmzi_core::UserRecorder) and answered with 202 before
//! they reach storage. Reads and the premium flag go to the registry directly.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use filmzi_core::{ProfileUpdate, SearchRecord, UserError, UserProfile};
use serde::{Deserialize, Serialize};

use super::{AcceptedResponse, ErrorResponse};
use crate::state::AppState;

/// Maximum allowed limit for search history queries
const MAX_LIMIT: u32 = 100;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PremiumBody {
    pub is_premium: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    20
}

#[derive(Debug, Serialize)]
pub struct SearchHistoryResponse {
    pub user_id: i64,
    pub searches: Vec<SearchRecord>,
}

fn user_error(e: UserError) -> ApiError {
    let status = match e {
        UserError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse::new(e.to_string())))
}

fn queue_full() -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse::new("User event queue is unavailable")),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// PUT /api/v1/users/{id}
///
/// Record an interaction: create the user or refresh its profile.
pub async fn record_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(profile): Json<ProfileUpdate>,
) -> Result<(StatusCode, Json<AcceptedResponse>), ApiError> {
    if !state.recorder().record_user(user_id, profile) {
        return Err(queue_full());
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse {
            message: format!("Queued profile of user {}", user_id),
        }),
    ))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserProfile>, ApiError> {
    state.users().get(user_id).map(Json).map_err(user_error)
}

/// PUT /api/v1/users/{id}/premium
///
/// Set or clear the premium flag of a known user.
pub async fn set_premium(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(body): Json<PremiumBody>,
) -> Result<Json<UserProfile>, ApiError> {
    let users = state.users();
    users
        .set_premium(user_id, body.is_premium)
        .map_err(user_error)?;
    users.get(user_id).map(Json).map_err(user_error)
}

/// POST /api/v1/users/{id}/searches
///
/// Append a query to the user's search history.
pub async fn record_search(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(body): Json<SearchBody>,
) -> Result<(StatusCode, Json<AcceptedResponse>), ApiError> {
    if body.query.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("query must not be empty")),
        ));
    }
    if !state.recorder().record_search(user_id, body.query) {
        return Err(queue_full());
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse {
            message: format!("Queued search of user {}", user_id),
        }),
    ))
}

/// GET /api/v1/users/{id}/searches?limit=
///
/// Most recent searches of a user, newest first.
pub async fn list_searches(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<SearchHistoryResponse>, ApiError> {
    let searches = state
        .users()
        .recent_searches(user_id, params.limit.min(MAX_LIMIT))
        .map_err(user_error)?;

    Ok(Json(SearchHistoryResponse { user_id, searches }))
}
