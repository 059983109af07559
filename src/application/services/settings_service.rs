use crate::{
    domain::entities::PluginSettings,
    domain::ports::settings_repository::SettingsRepository,
    infrastructure::http::middleware::error::ApiResult,
};
use std::sync::Arc;

/// Plugin switches, read fresh from storage on every call.
#[derive(Clone)]
pub struct SettingsService {
    settings_repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(settings_repo: Arc<dyn SettingsRepository>) -> Self {
        Self { settings_repo }
    }

    /// Missing row means defaults (everything enabled).
    pub async fn load(&self) -> ApiResult<PluginSettings> {
        Ok(self
            .settings_repo
            .get_plugin_settings()
            .await?
            .unwrap_or_default())
    }

    pub async fn update(&self, settings: PluginSettings) -> ApiResult<PluginSettings> {
        self.settings_repo.save_plugin_settings(&settings).await?;
        Ok(settings)
    }

    /// Create the settings row if it does not exist yet. Returns true when created.
    pub async fn ensure_defaults(&self) -> ApiResult<bool> {
        if self.settings_repo.get_plugin_settings().await?.is_some() {
            return Ok(false);
        }

        tracing::info!("Creating default plugin settings");
        self.settings_repo
            .save_plugin_settings(&PluginSettings::default())
            .await?;
        Ok(true)
    }
}
