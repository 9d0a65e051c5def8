pub mod redis_pool;
pub mod snapshot;
