use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::ProductCache;
use crate::error::AppResult;
use crate::models::{Order, Product};

use super::{OrderHistorySource, ProductCatalogSource};

/// Order history backed by the `orders` and `order_items` tables
pub struct PgOrderHistory {
    pool: PgPool,
}

impl PgOrderHistory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: String,
    user_id: i32,
    status: String,
    created_at: DateTime<Utc>,
    product_id: String,
}

#[async_trait]
impl OrderHistorySource for PgOrderHistory {
    async fn list_all_orders(&self) -> AppResult<Vec<Order>> {
        // One row per line item, ordered so each order's rows are adjacent
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT o.id AS order_id, o.user_id, o.status, o.created_at, i.product_id \
             FROM orders o \
             JOIN order_items i ON i.order_id = o.id \
             ORDER BY o.id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut orders: Vec<Order> = Vec::new();
        for row in rows {
            match orders.last_mut() {
                Some(order) if order.id == row.order_id => {
                    order.product_ids.push(row.product_id);
                }
                _ => orders.push(Order {
                    id: row.order_id,
                    user_id: row.user_id,
                    status: row.status,
                    created_at: row.created_at,
                    product_ids: vec![row.product_id],
                }),
            }
        }

        Ok(orders)
    }
}

/// Product catalog backed by the `products` table, read through Redis
pub struct PgProductCatalog {
    pool: PgPool,
    cache: ProductCache,
}

impl PgProductCatalog {
    pub fn new(pool: PgPool, cache: ProductCache) -> Self {
        Self { pool, cache }
    }
}

#[async_trait]
impl ProductCatalogSource for PgProductCatalog {
    async fn get_product(&self, product_id: &str) -> AppResult<Option<Product>> {
        if let Some(cached) = self.cache.get(product_id).await {
            return Ok(Some(cached));
        }

        let product: Option<Product> = sqlx::query_as(
            "SELECT id, name, category, image_url, price FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(ref product) = product {
            self.cache.store(product).await;
        }

        Ok(product)
    }

    async fn get_products_by_ids(
        &self,
        product_ids: &[String],
    ) -> AppResult<HashMap<String, Product>> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let products: Vec<Product> = sqlx::query_as(
            "SELECT id, name, category, image_url, price FROM products WHERE id = ANY($1)",
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(products.into_iter().map(|p| (p.id.clone(), p)).collect())
    }
}
