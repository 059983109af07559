use crate::{
    application::services::ContentQuery,
    domain::entities::{Caller, TemplateContent, TemplateType},
    infrastructure::http::middleware::AppState,
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

/// Raw query string. Everything arrives as text so that a malformed value
/// degrades to "no match" instead of a 400.
#[derive(Debug, Default, Deserialize)]
pub struct ContentParams {
    pub template_type: Option<String>,
    pub project_id: Option<String>,
    pub tracker_id: Option<String>,
    pub status_id: Option<String>,
    pub template_id: Option<String>,
}

/// Outer `None` marks a value that failed to parse.
fn parse_param<T: std::str::FromStr>(raw: Option<&str>) -> Option<Option<T>> {
    match raw.map(str::trim) {
        None | Some("") => Some(None),
        Some(value) => value.parse().ok().map(Some),
    }
}

impl ContentParams {
    /// `None` when any supplied value cannot be parsed.
    pub fn to_query(&self) -> Option<ContentQuery> {
        Some(ContentQuery {
            template_type: parse_param(self.template_type.as_deref())?,
            project_id: parse_param(self.project_id.as_deref())?,
            tracker_id: parse_param(self.tracker_id.as_deref())?,
            status_id: parse_param(self.status_id.as_deref())?,
            template_id: parse_param(self.template_id.as_deref())?,
        })
    }
}

pub async fn get_templates(
    State(state): State<AppState>,
    caller: Option<axum::Extension<Caller>>,
    Query(params): Query<ContentParams>,
) -> Json<Vec<TemplateContent>> {
    let caller = caller.map(|axum::Extension(c)| c).unwrap_or_default();

    let Some(query) = params.to_query() else {
        tracing::debug!("Unparseable template content query: {:?}", params);
        return Json(Vec::new());
    };

    let settings = match state.settings_service.load().await {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to load plugin settings, using defaults: {}", e);
            Default::default()
        }
    };

    Json(state.template_resolver.serve(&query, &caller, &settings).await)
}
