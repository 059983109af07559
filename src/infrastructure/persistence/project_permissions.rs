use crate::domain::ports::project_permission_repository::ProjectPermissionRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use sqlx::Row;

#[async_trait]
impl ProjectPermissionRepository for Database {
    async fn user_has_project_permission(
        &self,
        user_id: i64,
        project_id: i64,
        permission: &str,
    ) -> ApiResult<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count
             FROM project_permissions
             WHERE user_id = ? AND project_id = ? AND permission = ?",
        )
        .bind(user_id)
        .bind(project_id)
        .bind(permission)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.try_get("count")?;
        Ok(count > 0)
    }
}

impl Database {
    /// Mirrors a host grant into the local permission table.
    pub async fn grant_project_permission(
        &self,
        user_id: i64,
        project_id: i64,
        permission: &str,
    ) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO project_permissions (user_id, project_id, permission, granted_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(user_id, project_id, permission) DO NOTHING",
        )
        .bind(user_id)
        .bind(project_id)
        .bind(permission)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
