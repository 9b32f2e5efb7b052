use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A historical order as seen by the recommendation engine
///
/// Carries the full line-item product list; duplicates within one order are
/// possible and collapse to a single co-purchase signal during matrix builds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub user_id: i32,
    /// Fulfillment status (Pending, Processing, Shipped, Delivered, Cancelled)
    pub status: String,
    pub created_at: DateTime<Utc>,
    /// One product id per line item
    pub product_ids: Vec<String>,
}

/// Catalog record resolved when enriching recommended ids into products
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub image_url: String,
    /// Price in minor currency units
    pub price: i64,
}
