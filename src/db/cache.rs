use redis::{AsyncCommands, Client};

use crate::models::Product;

const PRODUCT_CACHE_TTL: u64 = 3600; // 1 hour in seconds

/// Creates a Redis client for caching
///
/// Establishes a connection to Redis for fast data caching.
/// Uses connection pooling via the connection-manager feature.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Read-through cache for catalog product records, keyed by product id
///
/// The cache is never a source of truth: every failure (connection, command,
/// deserialization) is logged and treated as a miss so catalog lookups fall
/// back to the database.
#[derive(Clone)]
pub struct ProductCache {
    redis_client: Client,
}

impl ProductCache {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }

    /// Attempts to retrieve a cached product record
    pub async fn get(&self, product_id: &str) -> Option<Product> {
        let cache_key = Self::cache_key(product_id);

        let mut conn = match self.redis_client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "Redis connection failed");
                return None;
            }
        };

        let cached: Option<String> = match conn.get(&cache_key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Redis get failed");
                return None;
            }
        };

        match cached {
            Some(json) => match serde_json::from_str(&json) {
                Ok(product) => {
                    tracing::debug!(product_id = %product_id, "Cache hit");
                    Some(product)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Cache deserialization error");
                    None
                }
            },
            None => None,
        }
    }

    /// Stores a product record with a fixed TTL
    pub async fn store(&self, product: &Product) {
        let cache_key = Self::cache_key(&product.id);

        let json = match serde_json::to_string(product) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Cache serialization error");
                return;
            }
        };

        let mut conn = match self.redis_client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "Redis connection failed");
                return;
            }
        };

        let result: Result<(), redis::RedisError> =
            conn.set_ex(&cache_key, json, PRODUCT_CACHE_TTL).await;

        match result {
            Ok(()) => {
                tracing::debug!(product_id = %product.id, ttl = PRODUCT_CACHE_TTL, "Cached product")
            }
            Err(e) => tracing::warn!(error = %e, "Redis set failed"),
        }
    }

    fn cache_key(product_id: &str) -> String {
        format!("product:{}", product_id)
    }
}
