pub mod cache;
pub mod postgres;

pub use cache::create_redis_client;
pub use cache::ProductCache;
pub use postgres::create_pool;
