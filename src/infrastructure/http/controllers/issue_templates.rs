use crate::{
    application::services::{MoveOutcome, ReorderDirection, TemplateIndex},
    domain::entities::{IssueTemplate, IssueTemplatePatch, NewIssueTemplate, TemplateType},
    domain::errors::DomainError,
    infrastructure::http::middleware::{ApiError, ApiResult, AppState},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};

fn default_enabled() -> bool {
    true
}

/// Distinguish an absent field from an explicit `null`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub content: String,
    pub template_type: String,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub tracker_id: Option<i64>,
    #[serde(default)]
    pub issue_status_id: Option<i64>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl TryFrom<CreateTemplateRequest> for NewIssueTemplate {
    type Error = DomainError;

    fn try_from(request: CreateTemplateRequest) -> Result<Self, Self::Error> {
        let template_type: TemplateType = request.template_type.parse()?;

        Ok(NewIssueTemplate {
            name: request.name,
            description: request.description,
            content: request.content,
            template_type,
            project_id: request.project_id,
            tracker_id: request.tracker_id,
            issue_status_id: request.issue_status_id,
            position: request.position,
            is_global: request.is_global,
            enabled: request.enabled,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTemplateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub template_type: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub project_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub tracker_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub issue_status_id: Option<Option<i64>>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub is_global: Option<bool>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl TryFrom<UpdateTemplateRequest> for IssueTemplatePatch {
    type Error = DomainError;

    fn try_from(request: UpdateTemplateRequest) -> Result<Self, Self::Error> {
        let template_type = request
            .template_type
            .map(|t| t.parse::<TemplateType>())
            .transpose()?;

        Ok(IssueTemplatePatch {
            name: request.name,
            description: request.description,
            content: request.content,
            template_type,
            project_id: request.project_id,
            tracker_id: request.tracker_id,
            issue_status_id: request.issue_status_id,
            position: request.position,
            is_global: request.is_global,
            enabled: request.enabled,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub direction: String,
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub id: i64,
    pub moved: bool,
    pub swapped_with: Option<i64>,
}

pub async fn list_templates(State(state): State<AppState>) -> ApiResult<Json<TemplateIndex>> {
    let index = state.template_service.list_grouped().await?;
    Ok(Json(index))
}

pub async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<CreateTemplateRequest>,
) -> ApiResult<(StatusCode, Json<IssueTemplate>)> {
    let new_template = NewIssueTemplate::try_from(request)?;
    let template = state.template_service.insert(new_template).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<IssueTemplate>> {
    let template = state.template_service.get(id).await?;
    Ok(Json(template))
}

pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTemplateRequest>,
) -> ApiResult<Json<IssueTemplate>> {
    let patch = IssueTemplatePatch::try_from(request)?;
    if patch.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let template = state.template_service.update(id, patch).await?;
    Ok(Json(template))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.template_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder_template(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<Json<ReorderResponse>> {
    let reordered = match request.direction.parse::<ReorderDirection>() {
        Ok(direction) => state.position_service.reorder(id, direction).await,
        Err(e) => Err(e.into()),
    };

    let outcome = match reordered {
        Ok(outcome) => outcome,
        Err(ApiError::NotFound(msg)) => return Err(ApiError::NotFound(msg)),
        Err(e) => {
            tracing::error!("Failed to reorder template {}: {}", id, e);
            return Err(ApiError::UnprocessableEntity(
                "Failed to reorder template".to_string(),
            ));
        }
    };

    let swapped_with = match outcome {
        MoveOutcome::Moved { swapped_with } => Some(swapped_with),
        MoveOutcome::Unchanged => None,
    };

    Ok(Json(ReorderResponse {
        id,
        moved: swapped_with.is_some(),
        swapped_with,
    }))
}
