//! Fast-store (Redis) implementations
//!
//! [`RedisClient`] owns the connection, the retry policy and the
//! per-operation response timeout. [`RedisStore`] layers the domain key
//! schema on top of it; its trait implementations are spread across this
//! module by concern:
//!
//! - `verification_cache` - challenges, verification flags, rate counters
//!   and the blacklist set
//! - `queue_cache` - the sync/retry queues and the audit buffer
//! - `snapshot_cache` - the health probe and the power-down dump/restore

pub mod queue_cache;
pub mod redis_client;
pub mod snapshot_cache;
pub mod verification_cache;

pub use redis_client::RedisClient;
pub use verification_cache::RedisStore;
