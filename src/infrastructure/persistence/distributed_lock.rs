use crate::domain::ports::distributed_lock::DistributedLock;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::time::Duration;

/// Lock rows in `distributed_locks`, taken over once expired.
#[derive(Clone)]
pub struct DatabaseDistributedLock {
    db: Database,
}

impl DatabaseDistributedLock {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DistributedLock for DatabaseDistributedLock {
    async fn try_acquire(&self, key: &str, owner: &str, ttl: Duration) -> ApiResult<bool> {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| ApiError::Internal(format!("Invalid lock ttl: {}", e)))?;
        let expires_at = (now + ttl).to_rfc3339_opts(SecondsFormat::Micros, true);
        let now = now.to_rfc3339_opts(SecondsFormat::Micros, true);

        // Fixed-width UTC timestamps compare correctly as strings
        let result = sqlx::query(
            "INSERT INTO distributed_locks (key, owner, expires_at, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                 owner = excluded.owner,
                 expires_at = excluded.expires_at,
                 created_at = excluded.created_at
             WHERE distributed_locks.expires_at < ?",
        )
        .bind(key)
        .bind(owner)
        .bind(&expires_at)
        .bind(&now)
        .bind(&now)
        .execute(&self.db.pool)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to acquire lock {}: {}", key, e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn release(&self, key: &str, owner: &str) -> ApiResult<()> {
        sqlx::query("DELETE FROM distributed_locks WHERE key = ? AND owner = ?")
            .bind(key)
            .bind(owner)
            .execute(&self.db.pool)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to release lock {}: {}", key, e)))?;
        Ok(())
    }
}
