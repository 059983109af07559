use crate::{
    domain::entities::{
        IssueTemplate, IssueTemplatePatch, NewIssueTemplate, TemplateOrder, TemplateQuery,
        TemplateType,
    },
    domain::errors::DomainError,
    domain::ports::template_repository::TemplateRepository,
    infrastructure::http::middleware::error::{ApiError, ApiResult},
};
use serde::Serialize;
use std::sync::Arc;

/// Admin index, grouped by template type
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateIndex {
    pub creation: Vec<IssueTemplate>,
    pub status_change: Vec<IssueTemplate>,
}

/// Durable template store: validation, default positions and scope queries.
#[derive(Clone)]
pub struct TemplateService {
    template_repo: Arc<dyn TemplateRepository>,
}

impl TemplateService {
    pub fn new(template_repo: Arc<dyn TemplateRepository>) -> Self {
        Self { template_repo }
    }

    pub async fn insert(&self, template: NewIssueTemplate) -> ApiResult<IssueTemplate> {
        template.validate()?;
        self.template_repo.create_template(&template).await
    }

    pub async fn get(&self, id: i64) -> ApiResult<IssueTemplate> {
        self.template_repo
            .get_template_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Template {} not found", id)))
    }

    pub async fn update(&self, id: i64, patch: IssueTemplatePatch) -> ApiResult<IssueTemplate> {
        let mut template = self.get(id).await?;
        let original_type = template.template_type;
        let original_position = template.position;

        if let Some(new_type) = patch.template_type {
            if new_type != original_type && patch.position.is_none() {
                return Err(DomainError::ValidationError(
                    "Changing the template type requires a position in the new type".to_string(),
                )
                .into());
            }
        }

        patch.apply_to(&mut template);
        template.validate()?;

        let claim_position =
            template.template_type != original_type || template.position != original_position;

        template.updated_at = chrono::Utc::now().to_rfc3339();
        self.template_repo
            .update_template(&template, claim_position)
            .await?;

        tracing::info!("Template updated: id={}, name={}", template.id, template.name);
        self.get(id).await
    }

    /// Surviving positions are left as they are.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        if !self.template_repo.delete_template(id).await? {
            return Err(ApiError::NotFound(format!("Template {} not found", id)));
        }

        tracing::info!("Template deleted: id={}", id);
        Ok(())
    }

    pub async fn query_by_scope(&self, query: &TemplateQuery) -> ApiResult<Vec<IssueTemplate>> {
        self.template_repo.query_templates(query).await
    }

    pub async fn list_grouped(&self) -> ApiResult<TemplateIndex> {
        let templates = self
            .template_repo
            .query_templates(&TemplateQuery::default().ordered_by(TemplateOrder::Grouped))
            .await?;

        let mut index = TemplateIndex::default();
        for template in templates {
            match template.template_type {
                TemplateType::Creation => index.creation.push(template),
                TemplateType::StatusChange => index.status_change.push(template),
            }
        }

        Ok(index)
    }

    pub async fn is_empty(&self) -> ApiResult<bool> {
        Ok(self.template_repo.count_templates().await? == 0)
    }
}
