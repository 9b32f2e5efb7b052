use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use serde_json::Value;

use shoprec_api::api::{create_router, AppState};
use shoprec_api::error::{AppError, AppResult};
use shoprec_api::models::{Order, Product};
use shoprec_api::services::sources::{OrderHistorySource, ProductCatalogSource};
use shoprec_api::services::RecommendationService;

/// Order history held in memory, optionally switched into a failing state
struct InMemoryOrders {
    orders: Vec<Order>,
    fail: Arc<AtomicBool>,
}

#[async_trait]
impl OrderHistorySource for InMemoryOrders {
    async fn list_all_orders(&self) -> AppResult<Vec<Order>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }
        Ok(self.orders.clone())
    }
}

struct InMemoryCatalog {
    products: HashMap<String, Product>,
}

#[async_trait]
impl ProductCatalogSource for InMemoryCatalog {
    async fn get_product(&self, product_id: &str) -> AppResult<Option<Product>> {
        Ok(self.products.get(product_id).cloned())
    }

    async fn get_products_by_ids(
        &self,
        product_ids: &[String],
    ) -> AppResult<HashMap<String, Product>> {
        Ok(product_ids
            .iter()
            .filter_map(|id| self.products.get(id).map(|p| (id.clone(), p.clone())))
            .collect())
    }
}

fn order(id: &str, product_ids: &[&str]) -> Order {
    Order {
        id: id.to_string(),
        user_id: 7,
        status: "Delivered".to_string(),
        created_at: Utc::now(),
        product_ids: product_ids.iter().map(|s| s.to_string()).collect(),
    }
}

fn product(id: &str, category: &str) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {}", id),
        category: category.to_string(),
        image_url: format!("https://img.example/{}.jpg", id),
        price: 25_000,
    }
}

/// Three orders: P1+P2 twice, P1+P3 once. Catalog: P1 and P2 are keyboards,
/// P3 is a mouse.
fn scenario_state(fail: Arc<AtomicBool>) -> AppState {
    let orders = InMemoryOrders {
        orders: vec![
            order("o1", &["P1", "P2"]),
            order("o2", &["P1", "P2"]),
            order("o3", &["P1", "P3"]),
        ],
        fail,
    };

    let products = [
        product("P1", "keyboards"),
        product("P2", "keyboards"),
        product("P3", "mice"),
    ];
    let catalog = InMemoryCatalog {
        products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
    };

    AppState::new(RecommendationService::new(
        Arc::new(orders),
        Arc::new(catalog),
    ))
}

fn create_test_server() -> TestServer {
    let state = scenario_state(Arc::new(AtomicBool::new(false)));
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_recommendations_are_empty_before_first_build() {
    let server = create_test_server();

    let response = server.get("/api/recommend/ids/P1").await;
    response.assert_status_ok();
    let ids: Vec<String> = response.json();
    assert!(ids.is_empty());
}

#[tokio::test]
async fn test_build_and_recommend_ids() {
    let server = create_test_server();

    let response = server.post("/api/recommend/build").await;
    response.assert_status_ok();

    let response = server.get("/api/recommend/ids/P1").await;
    response.assert_status_ok();
    let ids: Vec<String> = response.json();
    assert_eq!(ids, vec!["P2".to_string(), "P3".to_string()]);

    // Tighter limit keeps only the strongest neighbor
    let response = server
        .get("/api/recommend/ids/P1")
        .add_query_param("limit", 1)
        .await;
    response.assert_status_ok();
    let ids: Vec<String> = response.json();
    assert_eq!(ids, vec!["P2".to_string()]);
}

#[tokio::test]
async fn test_unknown_seed_yields_empty_list() {
    let server = create_test_server();
    server.post("/api/recommend/build").await.assert_status_ok();

    let response = server.get("/api/recommend/ids/does-not-exist").await;
    response.assert_status_ok();
    let ids: Vec<String> = response.json();
    assert!(ids.is_empty());
}

#[tokio::test]
async fn test_zero_limit_is_rejected() {
    let server = create_test_server();
    server.post("/api/recommend/build").await.assert_status_ok();

    let response = server
        .get("/api/recommend/ids/P1")
        .add_query_param("limit", 0)
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommend_products_filters_to_seed_category() {
    let server = create_test_server();
    server.post("/api/recommend/build").await.assert_status_ok();

    let response = server.get("/api/recommend/product/P1").await;
    response.assert_status_ok();

    // P3 is co-purchased but sits in another category
    let products: Vec<Value> = response.json();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["id"], "P2");
    assert_eq!(products[0]["category"], "keyboards");
    assert_eq!(products[0]["name"], "Product P2");
    assert_eq!(products[0]["price"], 25_000);
}

#[tokio::test]
async fn test_matrix_snapshot_is_symmetric() {
    let server = create_test_server();
    server.post("/api/recommend/build").await.assert_status_ok();

    let response = server.get("/api/recommend/matrix").await;
    response.assert_status_ok();

    let matrix: Value = response.json();
    assert_eq!(matrix["P1"]["P2"], 2);
    assert_eq!(matrix["P2"]["P1"], 2);
    assert_eq!(matrix["P1"]["P3"], 1);
    assert_eq!(matrix["P3"]["P1"], 1);
}

#[tokio::test]
async fn test_failed_build_reports_error_and_keeps_matrix() {
    let fail = Arc::new(AtomicBool::new(false));
    let server = TestServer::new(create_router(scenario_state(fail.clone()))).unwrap();

    server.post("/api/recommend/build").await.assert_status_ok();

    fail.store(true, Ordering::SeqCst);
    let response = server.post("/api/recommend/build").await;
    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);

    // The matrix from the successful build is still being served
    let response = server.get("/api/recommend/ids/P1").await;
    response.assert_status_ok();
    let ids: Vec<String> = response.json();
    assert_eq!(ids, vec!["P2".to_string(), "P3".to_string()]);
}

#[tokio::test]
async fn test_scheduled_rebuild_is_accepted_and_applies() {
    let server = create_test_server();

    let response = server.post("/api/recommend/rebuild").await;
    response.assert_status(axum::http::StatusCode::ACCEPTED);

    // The build runs in the background; poll briefly for it to land
    let mut ids: Vec<String> = Vec::new();
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let response = server.get("/api/recommend/ids/P1").await;
        response.assert_status_ok();
        ids = response.json();
        if !ids.is_empty() {
            break;
        }
    }
    assert_eq!(ids, vec!["P2".to_string(), "P3".to_string()]);
}
