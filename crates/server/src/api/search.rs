//! Search API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use filmzi_core::SearchPage;
use serde::Deserialize;

use crate::state::AppState;

/// Maximum allowed page size for search queries
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    /// Page size; the configured first-page size when absent.
    pub limit: Option<u32>,
}

/// GET /api/v1/search?q=&limit=
///
/// First page of ranked results. Short queries and storage failures both
/// answer with an empty page.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<SearchPage> {
    let search = state.search();
    let page = match params.limit {
        Some(limit) => search.page(&params.q, limit.min(MAX_LIMIT)),
        None => search.first_page(&params.q),
    };
    Json(page)
}

/// GET /api/v1/search/more?q=
///
/// The larger "show more" page, ranked the same way as the first page.
pub async fn search_more(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<SearchPage> {
    Json(state.search().more(&params.q))
}
