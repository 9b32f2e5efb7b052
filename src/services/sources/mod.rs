use std::collections::HashMap;

use crate::error::AppResult;
use crate::models::{Order, Product};

pub mod postgres;

/// Supplies the full order history the co-purchase matrix is built from
///
/// Every order counts, regardless of fulfillment status; the builder decides
/// what to do with the result. Kept behind a trait so the engine can be
/// exercised with injected in-memory histories.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait OrderHistorySource: Send + Sync {
    async fn list_all_orders(&self) -> AppResult<Vec<Order>>;
}

/// Resolves product ids into catalog records
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProductCatalogSource: Send + Sync {
    /// Single-record lookup; `None` when the id is not in the catalog
    async fn get_product(&self, product_id: &str) -> AppResult<Option<Product>>;

    /// Batch lookup; ids missing from the catalog are simply absent from
    /// the result
    async fn get_products_by_ids(&self, product_ids: &[String])
        -> AppResult<HashMap<String, Product>>;
}
