mod helpers;

use helpers::*;
use issue_templates::bootstrap::seed_default_templates;
use issue_templates::domain::entities::{PluginSettings, TemplateType};

#[tokio::test]
async fn test_missing_settings_load_as_defaults() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    let settings = services.settings.load().await.unwrap();
    assert_eq!(settings, PluginSettings::default());
    assert!(settings.creation_templates_enabled);
    assert!(settings.status_templates_enabled);
}

#[tokio::test]
async fn test_update_is_visible_on_next_load() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    let new_settings = PluginSettings {
        creation_templates_enabled: true,
        status_templates_enabled: false,
    };
    services.settings.update(new_settings).await.unwrap();

    assert_eq!(services.settings.load().await.unwrap(), new_settings);

    // A second write replaces the single row
    services
        .settings
        .update(PluginSettings::default())
        .await
        .unwrap();
    assert_eq!(
        services.settings.load().await.unwrap(),
        PluginSettings::default()
    );
}

#[tokio::test]
async fn test_ensure_defaults_only_creates_once() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    assert!(services.settings.ensure_defaults().await.unwrap());

    services
        .settings
        .update(PluginSettings {
            creation_templates_enabled: false,
            status_templates_enabled: false,
        })
        .await
        .unwrap();

    assert!(!services.settings.ensure_defaults().await.unwrap());
    assert!(!services.settings.load().await.unwrap().creation_templates_enabled);
}

#[tokio::test]
async fn test_seed_fills_empty_store_once() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    assert_eq!(seed_default_templates(&services.templates).await.unwrap(), 5);
    assert_eq!(seed_default_templates(&services.templates).await.unwrap(), 0);

    let index = services.templates.list_grouped().await.unwrap();
    let names: Vec<&str> = index.creation.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Bug Report", "Feature Request"]);
    assert_eq!(index.status_change.len(), 3);
    assert!(index
        .status_change
        .iter()
        .all(|t| t.is_global && t.enabled && t.template_type == TemplateType::StatusChange));

    assert_eq!(
        positions_of(&services, TemplateType::StatusChange)
            .await
            .into_iter()
            .map(|(_, p)| p)
            .collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[tokio::test]
async fn test_seed_skips_non_empty_store() {
    let db = setup_test_db().await;
    let services = build_services(&db);
    insert(&services, creation("Custom")).await;

    assert_eq!(seed_default_templates(&services.templates).await.unwrap(), 0);
    assert!(!services.templates.is_empty().await.unwrap());
}
