use crate::{
    domain::entities::PluginSettings,
    infrastructure::http::middleware::{ApiResult, AppState},
};
use axum::{extract::State, Json};

pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<PluginSettings>> {
    let settings = state.settings_service.load().await?;
    Ok(Json(settings))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<PluginSettings>,
) -> ApiResult<Json<PluginSettings>> {
    let settings = state.settings_service.update(request).await?;
    tracing::info!(
        "Plugin settings updated: creation={}, status_change={}",
        settings.creation_templates_enabled,
        settings.status_templates_enabled
    );
    Ok(Json(settings))
}
