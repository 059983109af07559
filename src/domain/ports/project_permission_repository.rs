use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

/// Permission a caller needs on a project to read its scoped templates
pub const VIEW_ISSUES: &str = "view_issues";

/// Project-level authorization owned by the host application
#[async_trait]
pub trait ProjectPermissionRepository: Send + Sync {
    async fn user_has_project_permission(
        &self,
        user_id: i64,
        project_id: i64,
        permission: &str,
    ) -> ApiResult<bool>;

}
