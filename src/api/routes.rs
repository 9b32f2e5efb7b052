use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/recommend", recommend_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Recommendation routes under /api/recommend
fn recommend_routes() -> Router<AppState> {
    Router::new()
        .route("/product/:product_id", get(handlers::recommend_products))
        .route("/ids/:product_id", get(handlers::recommend_ids))
        .route("/build", post(handlers::build_matrix))
        .route("/rebuild", post(handlers::rebuild_matrix))
        .route("/matrix", get(handlers::get_matrix))
}
