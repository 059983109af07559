use crate::{
    domain::entities::{IssueTemplate, TemplateType},
    domain::errors::DomainError,
    domain::ports::distributed_lock::DistributedLock,
    domain::ports::template_repository::TemplateRepository,
    infrastructure::http::middleware::error::{ApiError, ApiResult},
};
use std::sync::Arc;
use std::time::Duration;

pub use crate::domain::entities::ReorderDirection;

const LOCK_ATTEMPTS: u32 = 50;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { swapped_with: i64 },
    /// Already first (or last); nothing changed
    Unchanged,
}

fn lock_key(template_type: TemplateType) -> String {
    format!("issue_template_positions:{}", template_type)
}

/// Reorders templates inside one template type by swapping neighbours.
///
/// Every operation takes the scope lock; the repository then re-reads the
/// scope ordered by `(position, id)` and writes through a single transaction,
/// so concurrent moves in the same scope never act on a stale ordering.
#[derive(Clone)]
pub struct PositionService {
    template_repo: Arc<dyn TemplateRepository>,
    lock: Arc<dyn DistributedLock>,
    lock_ttl: Duration,
}

impl PositionService {
    pub fn new(
        template_repo: Arc<dyn TemplateRepository>,
        lock: Arc<dyn DistributedLock>,
        lock_ttl: Duration,
    ) -> Self {
        Self {
            template_repo,
            lock,
            lock_ttl,
        }
    }

    pub async fn move_up(&self, template_id: i64) -> ApiResult<MoveOutcome> {
        self.reorder(template_id, ReorderDirection::Up).await
    }

    pub async fn move_down(&self, template_id: i64) -> ApiResult<MoveOutcome> {
        self.reorder(template_id, ReorderDirection::Down).await
    }

    pub async fn reorder(
        &self,
        template_id: i64,
        direction: ReorderDirection,
    ) -> ApiResult<MoveOutcome> {
        let template = self.load(template_id).await?;
        let scope = template.template_type;

        let owner = self.acquire_scope(scope).await?;
        let moved = self.template_repo.move_in_scope(template_id, direction).await;
        self.release_scope(scope, &owner).await;

        let outcome = match moved? {
            Some(swapped_with) => MoveOutcome::Moved { swapped_with },
            None => MoveOutcome::Unchanged,
        };
        tracing::info!(
            "Template {} reorder {:?} in {}: {:?}",
            template_id,
            direction,
            scope,
            outcome
        );
        Ok(outcome)
    }

    /// Exchange the positions of two templates of the same type.
    pub async fn swap(&self, first_id: i64, second_id: i64) -> ApiResult<()> {
        let first = self.load(first_id).await?;
        let second = self.load(second_id).await?;

        if first.template_type != second.template_type {
            return Err(DomainError::ValidationError(
                "Cannot swap templates of different types".to_string(),
            )
            .into());
        }

        if first_id == second_id {
            return Ok(());
        }

        let scope = first.template_type;
        let owner = self.acquire_scope(scope).await?;
        let result = self.template_repo.swap_positions(first_id, second_id).await;
        self.release_scope(scope, &owner).await;

        result
    }

    async fn load(&self, template_id: i64) -> ApiResult<IssueTemplate> {
        self.template_repo
            .get_template_by_id(template_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Template {} not found", template_id)))
    }

    async fn acquire_scope(&self, scope: TemplateType) -> ApiResult<String> {
        let key = lock_key(scope);
        let owner = uuid::Uuid::new_v4().to_string();

        for attempt in 1..=LOCK_ATTEMPTS {
            match self.lock.try_acquire(&key, &owner, self.lock_ttl).await {
                Ok(true) => return Ok(owner),
                Ok(false) => {}
                Err(e) => tracing::debug!("Lock attempt {} on {} failed: {}", attempt, key, e),
            }
            tokio::time::sleep(LOCK_RETRY_DELAY).await;
        }

        Err(ApiError::Conflict(format!(
            "Timed out waiting for {} ordering lock",
            scope
        )))
    }

    async fn release_scope(&self, scope: TemplateType, owner: &str) {
        let key = lock_key(scope);
        if let Err(e) = self.lock.release(&key, owner).await {
            // The lock still expires after its ttl
            tracing::warn!("Failed to release {}: {}", key, e);
        }
    }
}
