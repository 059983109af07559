use crate::domain::entities::PluginSettings;
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get_plugin_settings(&self) -> ApiResult<Option<PluginSettings>>;
    async fn save_plugin_settings(&self, settings: &PluginSettings) -> ApiResult<()>;
}
