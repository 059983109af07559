use issue_templates::application::services::{
    PositionService, SettingsService, TemplateResolver, TemplateService,
};
use issue_templates::domain::entities::{IssueTemplate, NewIssueTemplate, TemplateType};
use issue_templates::infrastructure::persistence::distributed_lock::DatabaseDistributedLock;
use issue_templates::infrastructure::persistence::Database;
use std::sync::Arc;
use std::time::Duration;

pub struct Services {
    pub templates: TemplateService,
    pub resolver: TemplateResolver,
    pub positions: PositionService,
    pub settings: SettingsService,
}

pub fn build_services(db: &Database) -> Services {
    Services {
        templates: TemplateService::new(Arc::new(db.clone())),
        resolver: TemplateResolver::new(Arc::new(db.clone()), Arc::new(db.clone())),
        positions: PositionService::new(
            Arc::new(db.clone()),
            Arc::new(DatabaseDistributedLock::new(db.clone())),
            Duration::from_secs(10),
        ),
        settings: SettingsService::new(Arc::new(db.clone())),
    }
}

pub fn creation(name: &str) -> NewIssueTemplate {
    NewIssueTemplate::new(name, format!("{} body", name), TemplateType::Creation)
}

pub fn status_change(name: &str) -> NewIssueTemplate {
    NewIssueTemplate::new(name, format!("{} body", name), TemplateType::StatusChange)
}

pub async fn insert(services: &Services, template: NewIssueTemplate) -> IssueTemplate {
    services
        .templates
        .insert(template)
        .await
        .expect("Failed to insert template")
}

/// Templates of one type in stored order
pub async fn positions_of(services: &Services, template_type: TemplateType) -> Vec<(i64, i64)> {
    use issue_templates::domain::entities::{TemplateOrder, TemplateQuery};

    services
        .templates
        .query_by_scope(&TemplateQuery::of_type(template_type).ordered_by(TemplateOrder::PositionId))
        .await
        .expect("Failed to query templates")
        .into_iter()
        .map(|t| (t.id, t.position))
        .collect()
}

pub fn ids(templates: &[IssueTemplate]) -> Vec<i64> {
    templates.iter().map(|t| t.id).collect()
}

pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";

pub fn test_config() -> issue_templates::config::Config {
    issue_templates::config::Config {
        database_url: String::new(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        admin_api_token: TEST_ADMIN_TOKEN.to_string(),
        reorder_lock_ttl_seconds: 10,
        seed_default_templates: false,
    }
}

pub fn build_test_app(db: &Database) -> axum::Router {
    let state = issue_templates::bootstrap::build_app_state(db.clone(), &test_config());
    issue_templates::infrastructure::http::router::build_router(state)
}
