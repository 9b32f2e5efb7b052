use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::Product;
use crate::services::CoPurchaseMatrix;

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    5
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub price: i64,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            category: product.category,
            image_url: product.image_url,
            price: product.price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Recommends products co-purchased with the given one, enriched into
/// catalog records and filtered to the seed's category
///
/// An empty list is a normal response, not an error.
pub async fn recommend_products(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(params): Query<RecommendParams>,
) -> AppResult<Json<Vec<ProductResponse>>> {
    let products = state
        .recommendations
        .recommend_products(&product_id, params.limit)
        .await?;

    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// Recommends raw product ids (useful for debugging)
pub async fn recommend_ids(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(params): Query<RecommendParams>,
) -> AppResult<Json<Vec<String>>> {
    let ids = state
        .recommendations
        .recommend_ids(&product_id, params.limit)
        .await?;

    Ok(Json(ids))
}

/// Rebuilds the co-purchase matrix and waits for completion (admin use)
pub async fn build_matrix(State(state): State<AppState>) -> AppResult<Json<MessageResponse>> {
    state.recommendations.build_matrix().await?;
    Ok(Json(MessageResponse {
        message: "Matrix built successfully",
    }))
}

/// Schedules a matrix rebuild without waiting for it
///
/// Fired after order-affecting events; failures are logged server-side.
pub async fn rebuild_matrix(
    State(state): State<AppState>,
) -> (StatusCode, Json<MessageResponse>) {
    state.recommendations.schedule_rebuild();
    (
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "Matrix rebuild scheduled",
        }),
    )
}

/// Returns a full snapshot of the published matrix (admin/debug use)
pub async fn get_matrix(State(state): State<AppState>) -> Json<CoPurchaseMatrix> {
    Json(state.recommendations.matrix_snapshot().await)
}
