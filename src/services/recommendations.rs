use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::models::{Order, Product};
use crate::services::matrix::CoPurchaseMatrix;
use crate::services::sources::{OrderHistorySource, ProductCatalogSource};

/// How many ranked candidates to pull per requested result when the query
/// filters by category, so the post-filter count stays close to the request
const CANDIDATE_POOL_FACTOR: usize = 3;

/// Co-purchase recommendation engine
///
/// Owns the process-wide co-purchase matrix. The published matrix lives
/// behind `RwLock<Arc<...>>`: readers clone the `Arc` and query without
/// holding the lock, and rebuilds construct a fresh matrix privately before
/// swapping the pointer in one step. A query therefore always sees either
/// the fully-old or the fully-new matrix, never a partially built one, and
/// a failed rebuild leaves the published matrix untouched.
#[derive(Clone)]
pub struct RecommendationService {
    orders: Arc<dyn OrderHistorySource>,
    products: Arc<dyn ProductCatalogSource>,
    matrix: Arc<RwLock<Arc<CoPurchaseMatrix>>>,
}

impl RecommendationService {
    /// Creates the service with an empty matrix; call
    /// [`build_matrix`](Self::build_matrix) to populate it
    pub fn new(
        orders: Arc<dyn OrderHistorySource>,
        products: Arc<dyn ProductCatalogSource>,
    ) -> Self {
        Self {
            orders,
            products,
            matrix: Arc::new(RwLock::new(Arc::new(CoPurchaseMatrix::new()))),
        }
    }

    /// Recomputes the co-purchase matrix from the full order history and
    /// publishes it, waiting for the whole pass to finish
    ///
    /// On an order-history failure the error propagates and the previously
    /// published matrix stays in place.
    pub async fn build_matrix(&self) -> AppResult<()> {
        let orders = self.orders.list_all_orders().await?;
        tracing::info!(order_count = orders.len(), "Building co-purchase matrix");

        let fresh = build_from_orders(&orders);
        tracing::info!(
            product_count = fresh.product_count(),
            "Co-purchase matrix built"
        );

        let mut published = self.matrix.write().await;
        *published = Arc::new(fresh);

        Ok(())
    }

    /// Fire-and-forget rebuild, for callers that must not wait (the hook
    /// after order creation). Failures are logged, not reported back.
    pub fn schedule_rebuild(&self) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.build_matrix().await {
                tracing::error!(error = %e, "Scheduled matrix rebuild failed");
            }
        });
    }

    /// Top `limit` co-purchased product ids for `seed`, best first
    ///
    /// An unknown seed yields an empty vector; a zero limit is rejected.
    pub async fn recommend_ids(&self, seed: &str, limit: usize) -> AppResult<Vec<String>> {
        if limit == 0 {
            return Err(AppError::InvalidInput(
                "limit must be a positive integer".to_string(),
            ));
        }

        let matrix = self.current_matrix().await;
        Ok(matrix
            .ranked(seed, limit)
            .into_iter()
            .map(|(id, _)| id)
            .collect())
    }

    /// Top co-purchased products for `seed`, enriched into catalog records
    /// and filtered to the seed product's category
    ///
    /// Pulls a candidate pool wider than `limit` before filtering, then
    /// accumulates matches in rank order until `limit` is met or the pool is
    /// exhausted. A seed missing from the catalog yields an empty result.
    pub async fn recommend_products(&self, seed: &str, limit: usize) -> AppResult<Vec<Product>> {
        let candidate_ids = self
            .recommend_ids(seed, limit * CANDIDATE_POOL_FACTOR)
            .await?;
        if candidate_ids.is_empty() {
            return Ok(Vec::new());
        }

        let seed_product = match self.products.get_product(seed).await? {
            Some(product) => product,
            None => return Ok(Vec::new()),
        };

        let mut records = self.products.get_products_by_ids(&candidate_ids).await?;

        let mut result = Vec::with_capacity(limit);
        for id in candidate_ids {
            let product = match records.remove(&id) {
                Some(product) => product,
                None => continue,
            };

            if product.category == seed_product.category {
                result.push(product);
            }

            if result.len() == limit {
                break;
            }
        }

        Ok(result)
    }

    /// Owned copy of the published matrix, for admin and debugging use
    pub async fn matrix_snapshot(&self) -> CoPurchaseMatrix {
        CoPurchaseMatrix::clone(&self.current_matrix().await)
    }

    async fn current_matrix(&self) -> Arc<CoPurchaseMatrix> {
        self.matrix.read().await.clone()
    }
}

/// Computes a co-purchase matrix from scratch over the given orders
///
/// Per order, line items reduce to the distinct product-id set; sets with
/// fewer than two members contribute nothing. Every unordered pair within a
/// set is visited exactly once and counted in both directions. Iterating the
/// sets in sorted order keeps rebuilds from identical input bit-identical.
fn build_from_orders(orders: &[Order]) -> CoPurchaseMatrix {
    let mut matrix = CoPurchaseMatrix::new();

    for order in orders {
        let distinct: BTreeSet<&str> = order.product_ids.iter().map(String::as_str).collect();
        if distinct.len() < 2 {
            continue;
        }

        let items: Vec<&str> = distinct.into_iter().collect();
        for i in 0..items.len() {
            for j in (i + 1)..items.len() {
                matrix.add_pair(items[i], items[j]);
                matrix.add_pair(items[j], items[i]);
            }
        }
    }

    matrix
}
