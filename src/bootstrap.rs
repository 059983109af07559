use crate::application::services::*;
use crate::config::Config;
use crate::domain::entities::{NewIssueTemplate, TemplateType};
use crate::domain::ports::distributed_lock::DistributedLock;
use crate::domain::ports::project_permission_repository::ProjectPermissionRepository;
use crate::domain::ports::settings_repository::SettingsRepository;
use crate::domain::ports::template_repository::TemplateRepository;
use crate::infrastructure::http::middleware::{ApiResult, AppState};
use crate::infrastructure::persistence::distributed_lock::DatabaseDistributedLock;
use crate::infrastructure::persistence::Database;
use std::sync::Arc;
use std::time::Duration;

pub fn build_app_state(db: Database, config: &Config) -> AppState {
    let template_repo: Arc<dyn TemplateRepository> = Arc::new(db.clone());
    let settings_repo: Arc<dyn SettingsRepository> = Arc::new(db.clone());
    let permission_repo: Arc<dyn ProjectPermissionRepository> = Arc::new(db.clone());
    let lock: Arc<dyn DistributedLock> = Arc::new(DatabaseDistributedLock::new(db));

    let template_service = TemplateService::new(template_repo.clone());
    let template_resolver = TemplateResolver::new(template_repo.clone(), permission_repo);
    let position_service = PositionService::new(
        template_repo,
        lock,
        Duration::from_secs(config.reorder_lock_ttl_seconds),
    );
    let settings_service = SettingsService::new(settings_repo);
    tracing::info!("Template services initialized");

    AppState {
        admin_api_token: Arc::from(config.admin_api_token.as_str()),
        template_service,
        template_resolver,
        position_service,
        settings_service,
    }
}

/// Create default settings and, on an empty store, the stock templates.
/// Failures are logged; the server still starts.
pub async fn initialize(state: &AppState, config: &Config) {
    match state.settings_service.ensure_defaults().await {
        Ok(true) => tracing::info!("Default plugin settings created"),
        Ok(false) => {}
        Err(e) => tracing::error!("Failed to create default plugin settings: {}", e),
    }

    if !config.seed_default_templates {
        return;
    }

    match seed_default_templates(&state.template_service).await {
        Ok(0) => tracing::debug!("Templates already present, skipping seed"),
        Ok(count) => tracing::info!("Seeded {} default templates", count),
        Err(e) => tracing::error!("Failed to seed default templates: {}", e),
    }
}

/// Returns how many templates were inserted.
pub async fn seed_default_templates(service: &TemplateService) -> ApiResult<usize> {
    if !service.is_empty().await? {
        return Ok(0);
    }

    let defaults = default_templates();
    let count = defaults.len();
    for template in defaults {
        service.insert(template).await?;
    }

    Ok(count)
}

fn stock(name: &str, content: &str, template_type: TemplateType, position: i64) -> NewIssueTemplate {
    NewIssueTemplate {
        position: Some(position),
        is_global: true,
        ..NewIssueTemplate::new(name, content, template_type)
    }
}

pub fn default_templates() -> Vec<NewIssueTemplate> {
    vec![
        stock(
            "Bug Report",
            "## Bug Description\n\n[Describe the bug in detail]\n\n\
             ## Steps to Reproduce\n\n1. \n2. \n3. \n\n\
             ## Expected Behavior\n\n[What should happen]\n\n\
             ## Actual Behavior\n\n[What actually happens]\n\n\
             ## Environment\n\n- Browser: \n- OS: \n- Version: ",
            TemplateType::Creation,
            1,
        ),
        stock(
            "Feature Request",
            "## Feature Description\n\n[Describe the feature you'd like to see]\n\n\
             ## Use Case\n\n[Explain why this feature would be useful]\n\n\
             ## Acceptance Criteria\n\n- [ ] \n- [ ] \n- [ ] \n\n\
             ## Additional Context\n\n[Any additional information]",
            TemplateType::Creation,
            2,
        ),
        stock(
            "In Progress Notes",
            "## Work Started\n\n[Describe what work has begun]\n\n\
             ## Next Steps\n\n- [ ] \n- [ ] \n\n\
             ## Estimated Completion\n\n[When do you expect this to be done?]",
            TemplateType::StatusChange,
            1,
        ),
        stock(
            "Testing Notes",
            "## Testing Performed\n\n- [ ] Unit tests\n- [ ] Integration tests\n- [ ] Manual testing\n\n\
             ## Test Results\n\n[Describe test outcomes]\n\n\
             ## Known Issues\n\n[Any issues found during testing]",
            TemplateType::StatusChange,
            2,
        ),
        stock(
            "Resolution Notes",
            "## Resolution Summary\n\n[How was this issue resolved?]\n\n\
             ## Changes Made\n\n- \n- \n\n\
             ## Testing\n\n[How was the fix verified?]\n\n\
             ## Follow-up Actions\n\n[Any additional work needed?]",
            TemplateType::StatusChange,
            3,
        ),
    ]
}
