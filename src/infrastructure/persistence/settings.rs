use crate::domain::entities::PluginSettings;
use crate::domain::ports::settings_repository::SettingsRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use sqlx::Row;

#[async_trait]
impl SettingsRepository for Database {
    async fn get_plugin_settings(&self) -> ApiResult<Option<PluginSettings>> {
        let row = sqlx::query(
            "SELECT creation_templates_enabled, status_templates_enabled
             FROM plugin_settings
             WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            Ok(Some(PluginSettings {
                creation_templates_enabled: row.try_get::<i64, _>("creation_templates_enabled")? != 0,
                status_templates_enabled: row.try_get::<i64, _>("status_templates_enabled")? != 0,
            }))
        } else {
            Ok(None)
        }
    }

    async fn save_plugin_settings(&self, settings: &PluginSettings) -> ApiResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO plugin_settings (id, creation_templates_enabled, status_templates_enabled, updated_at)
             VALUES (1, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 creation_templates_enabled = excluded.creation_templates_enabled,
                 status_templates_enabled = excluded.status_templates_enabled,
                 updated_at = excluded.updated_at",
        )
        .bind(settings.creation_templates_enabled)
        .bind(settings.status_templates_enabled)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "Plugin settings saved: creation_templates_enabled={}, status_templates_enabled={}",
            settings.creation_templates_enabled,
            settings.status_templates_enabled
        );
        Ok(())
    }
}
