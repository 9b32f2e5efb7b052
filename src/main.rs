use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use shoprec_api::api::{create_router, AppState};
use shoprec_api::config::Config;
use shoprec_api::db::{create_pool, create_redis_client, ProductCache};
use shoprec_api::services::sources::postgres::{PgOrderHistory, PgProductCatalog};
use shoprec_api::services::RecommendationService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let redis_client = create_redis_client(&config.redis_url)?;
    let cache = ProductCache::new(redis_client);

    let order_history = Arc::new(PgOrderHistory::new(pool.clone()));
    let product_catalog = Arc::new(PgProductCatalog::new(pool, cache));
    let recommendations = RecommendationService::new(order_history, product_catalog);

    if config.build_matrix_on_startup {
        // Serve an empty matrix rather than refuse to start; an admin
        // rebuild can recover once the order store is reachable again
        if let Err(e) = recommendations.build_matrix().await {
            tracing::warn!(error = %e, "Startup matrix build failed, serving an empty matrix");
        }
    }

    let app = create_router(AppState::new(recommendations));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
