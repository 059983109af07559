use crate::{
    domain::entities::{
        Caller, IssueTemplate, PluginSettings, ScopeFilter, TemplateContent, TemplateOrder,
        TemplateQuery, TemplateType,
    },
    domain::ports::project_permission_repository::{ProjectPermissionRepository, VIEW_ISSUES},
    domain::ports::template_repository::TemplateRepository,
    infrastructure::http::middleware::error::ApiResult,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Read-only request from the content endpoint
#[derive(Debug, Clone, Default)]
pub struct ContentQuery {
    pub template_type: Option<TemplateType>,
    pub project_id: Option<i64>,
    pub tracker_id: Option<i64>,
    pub status_id: Option<i64>,
    pub template_id: Option<i64>,
}

/// Picks the templates that apply to a project/tracker/status context.
#[derive(Clone)]
pub struct TemplateResolver {
    template_repo: Arc<dyn TemplateRepository>,
    permission_repo: Arc<dyn ProjectPermissionRepository>,
}

impl TemplateResolver {
    pub fn new(
        template_repo: Arc<dyn TemplateRepository>,
        permission_repo: Arc<dyn ProjectPermissionRepository>,
    ) -> Self {
        Self {
            template_repo,
            permission_repo,
        }
    }

    /// Creation templates, most specific tier first:
    /// project+tracker, then global+tracker, then project-only unioned with fully global.
    pub async fn resolve_creation(
        &self,
        project_id: Option<i64>,
        tracker_id: Option<i64>,
        settings: &PluginSettings,
    ) -> ApiResult<Vec<IssueTemplate>> {
        if !settings.creation_templates_enabled {
            return Ok(Vec::new());
        }

        let base = TemplateQuery::of_type(TemplateType::Creation)
            .enabled()
            .ordered_by(TemplateOrder::PositionName);

        if let Some(tracker_id) = tracker_id {
            let mut tracker_specific = Vec::new();

            if let Some(project_id) = project_id {
                tracker_specific = self
                    .template_repo
                    .query_templates(
                        &base
                            .clone()
                            .project(ScopeFilter::Equals(project_id))
                            .tracker(ScopeFilter::Equals(tracker_id)),
                    )
                    .await?;
            }

            if tracker_specific.is_empty() {
                tracker_specific = self
                    .template_repo
                    .query_templates(
                        &base
                            .clone()
                            .project(ScopeFilter::IsNull)
                            .tracker(ScopeFilter::Equals(tracker_id)),
                    )
                    .await?;
            }

            if !tracker_specific.is_empty() {
                return Ok(tracker_specific);
            }
        }

        let mut fallback = Vec::new();

        if let Some(project_id) = project_id {
            fallback.extend(
                self.template_repo
                    .query_templates(
                        &base
                            .clone()
                            .project(ScopeFilter::Equals(project_id))
                            .tracker(ScopeFilter::IsNull),
                    )
                    .await?,
            );
        }

        fallback.extend(
            self.template_repo
                .query_templates(
                    &base
                        .project(ScopeFilter::IsNull)
                        .tracker(ScopeFilter::IsNull),
                )
                .await?,
        );

        let mut merged = dedup_by_id(fallback);
        merged.sort_by(|a, b| a.cmp_display_order(b));
        Ok(merged)
    }

    /// Status-change templates: global ones for the status, then the project's own.
    /// A global template without a status applies to every status; project
    /// templates must name the status.
    pub async fn resolve_status_change(
        &self,
        project_id: Option<i64>,
        status_id: i64,
        settings: &PluginSettings,
    ) -> ApiResult<Vec<IssueTemplate>> {
        if !settings.status_templates_enabled {
            return Ok(Vec::new());
        }

        let base = TemplateQuery::of_type(TemplateType::StatusChange)
            .enabled()
            .ordered_by(TemplateOrder::PositionName);

        let mut templates = self
            .template_repo
            .query_templates(
                &base
                    .clone()
                    .global()
                    .status(ScopeFilter::NullOrEquals(status_id)),
            )
            .await?;

        if let Some(project_id) = project_id {
            templates.extend(
                self.template_repo
                    .query_templates(
                        &base
                            .project(ScopeFilter::Equals(project_id))
                            .status(ScopeFilter::Equals(status_id)),
                    )
                    .await?,
            );
        }

        Ok(dedup_by_id(templates))
    }

    /// Single enabled template the caller may read. Missing, disabled and
    /// unauthorized templates all come back as `None`.
    pub async fn find_accessible(&self, template_id: i64, caller: &Caller) -> Option<IssueTemplate> {
        let template = match self.template_repo.get_template_by_id(template_id).await {
            Ok(Some(template)) if template.enabled => template,
            Ok(_) => return None,
            Err(e) => {
                tracing::warn!("Failed to load template {}: {}", template_id, e);
                return None;
            }
        };

        if self.can_view(&template, caller).await {
            Some(template)
        } else {
            tracing::debug!(
                "Template {} hidden from caller {:?}",
                template_id,
                caller.user_id
            );
            None
        }
    }

    /// Content endpoint contract: never fails, worst case is an empty list.
    pub async fn serve(
        &self,
        query: &ContentQuery,
        caller: &Caller,
        settings: &PluginSettings,
    ) -> Vec<TemplateContent> {
        if let Some(template_id) = query.template_id {
            return self
                .find_accessible(template_id, caller)
                .await
                .into_iter()
                .map(TemplateContent::from)
                .collect();
        }

        let resolved = match (query.template_type, query.status_id) {
            (Some(TemplateType::Creation), _) => {
                self.resolve_creation(query.project_id, query.tracker_id, settings)
                    .await
            }
            (Some(TemplateType::StatusChange), Some(status_id)) => {
                self.resolve_status_change(query.project_id, status_id, settings)
                    .await
            }
            _ => self.filter_templates(query, settings).await,
        };

        match resolved {
            Ok(templates) => templates.into_iter().map(TemplateContent::from).collect(),
            Err(e) => {
                tracing::error!("Template resolution failed for {:?}: {}", query, e);
                Vec::new()
            }
        }
    }

    /// Loose "unset or equal" filtering for requests that carry no full context.
    async fn filter_templates(
        &self,
        query: &ContentQuery,
        settings: &PluginSettings,
    ) -> ApiResult<Vec<IssueTemplate>> {
        let mut scope = TemplateQuery {
            template_type: query.template_type,
            enabled_only: true,
            order: TemplateOrder::PositionName,
            ..TemplateQuery::default()
        };

        if let Some(project_id) = query.project_id {
            scope = scope.project(ScopeFilter::NullOrEquals(project_id));
        }

        if let Some(tracker_id) = query.tracker_id {
            scope = scope.tracker(ScopeFilter::NullOrEquals(tracker_id));
        }

        if let (Some(status_id), Some(TemplateType::StatusChange)) =
            (query.status_id, query.template_type)
        {
            scope = scope.status(ScopeFilter::NullOrEquals(status_id));
        }

        let templates = self.template_repo.query_templates(&scope).await?;

        Ok(templates
            .into_iter()
            .filter(|t| match t.template_type {
                TemplateType::Creation => settings.creation_templates_enabled,
                TemplateType::StatusChange => settings.status_templates_enabled,
            })
            .collect())
    }

    async fn can_view(&self, template: &IssueTemplate, caller: &Caller) -> bool {
        if template.is_publicly_visible() || caller.is_admin {
            return true;
        }

        let (Some(user_id), Some(project_id)) = (caller.user_id, template.project_id) else {
            return false;
        };

        match self
            .permission_repo
            .user_has_project_permission(user_id, project_id, VIEW_ISSUES)
            .await
        {
            Ok(allowed) => allowed,
            Err(e) => {
                tracing::warn!(
                    "Permission lookup failed for user {} on project {}: {}",
                    user_id,
                    project_id,
                    e
                );
                false
            }
        }
    }
}

/// Keep the first occurrence of each id, preserving order.
fn dedup_by_id(templates: Vec<IssueTemplate>) -> Vec<IssueTemplate> {
    let mut seen = HashSet::new();
    templates
        .into_iter()
        .filter(|t| seen.insert(t.id))
        .collect()
}
