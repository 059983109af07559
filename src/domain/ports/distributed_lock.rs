use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;
use std::time::Duration;

/// Named lock shared by every process using the same database.
#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// Try once to take `key` for `owner`. Expired holders are displaced.
    /// Returns false if someone else currently holds it.
    async fn try_acquire(&self, key: &str, owner: &str, ttl: Duration) -> ApiResult<bool>;

    /// Release `key` if `owner` still holds it.
    async fn release(&self, key: &str, owner: &str) -> ApiResult<()>;
}
