use crate::domain::entities::{IssueTemplate, NewIssueTemplate, ReorderDirection, TemplateQuery};
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Insert a template. A missing position becomes `max(position in type) + 1`.
    /// An explicit position already used in the type is rejected. Both are
    /// decided in the same statement as the insert.
    async fn create_template(&self, template: &NewIssueTemplate) -> ApiResult<IssueTemplate>;

    async fn get_template_by_id(&self, id: i64) -> ApiResult<Option<IssueTemplate>>;

    /// With `claim_position`, the write only happens if no other template of
    /// the same type holds the new position.
    async fn update_template(&self, template: &IssueTemplate, claim_position: bool) -> ApiResult<()>;

    /// Returns false when no row matched.
    async fn delete_template(&self, id: i64) -> ApiResult<bool>;

    async fn query_templates(&self, query: &TemplateQuery) -> ApiResult<Vec<IssueTemplate>>;

    async fn count_templates(&self) -> ApiResult<i64>;

    /// Exchange the positions of two templates in a single transaction.
    /// Positions are re-read inside the transaction.
    async fn swap_positions(&self, first_id: i64, second_id: i64) -> ApiResult<()>;

    /// Swap a template with its neighbour in `(position, id)` order, inside one
    /// transaction. Duplicate positions in the type are renumbered `1..=n` in
    /// that same transaction first. Returns the neighbour's id, or `None` when
    /// the template is already at that end.
    async fn move_in_scope(
        &self,
        template_id: i64,
        direction: ReorderDirection,
    ) -> ApiResult<Option<i64>>;
}
