use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{catalog, handlers, messages, middleware::metrics_middleware, search, users};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Channel listener
        .route("/messages", post(messages::push_message))
        // Search
        .route("/search", get(search::search))
        .route("/search/more", get(search::search_more))
        // Catalog
        .route("/catalog/stats", get(catalog::get_stats))
        .route("/catalog/recent", get(catalog::list_recent))
        .route("/catalog/titles/{title}", get(catalog::get_qualities))
        .route("/catalog/{id}", get(catalog::get_entry))
        // Users
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", put(users::record_user))
        .route("/users/{id}/premium", put(users::set_premium))
        .route("/users/{id}/searches", get(users::list_searches))
        .route("/users/{id}/searches", post(users::record_search));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
