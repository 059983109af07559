mod helpers;

use helpers::*;
use issue_templates::domain::entities::{NewIssueTemplate, PluginSettings};

const P1: i64 = 1;
const T1: i64 = 10;
const T2: i64 = 20;

fn scoped(name: &str, project_id: Option<i64>, tracker_id: Option<i64>) -> NewIssueTemplate {
    NewIssueTemplate {
        project_id,
        tracker_id,
        ..creation(name)
    }
}

#[tokio::test]
async fn test_project_tracker_match_shadows_everything_else() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    let a = insert(&services, scoped("A", Some(P1), Some(T1))).await;
    insert(
        &services,
        NewIssueTemplate {
            is_global: true,
            ..scoped("B", None, None)
        },
    )
    .await;
    insert(&services, scoped("C", None, None)).await;
    insert(&services, scoped("Tracker wide", None, Some(T1))).await;

    let resolved = services
        .resolver
        .resolve_creation(Some(P1), Some(T1), &PluginSettings::default())
        .await
        .unwrap();

    assert_eq!(ids(&resolved), vec![a.id]);
}

#[tokio::test]
async fn test_fallback_unions_project_and_global() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    let d = insert(&services, scoped("D", Some(P1), None)).await;
    let c = insert(&services, scoped("C", None, None)).await;
    // Other projects and other trackers stay out
    insert(&services, scoped("Elsewhere", Some(2), None)).await;
    insert(&services, scoped("Other tracker", Some(P1), Some(T1))).await;

    let resolved = services
        .resolver
        .resolve_creation(Some(P1), Some(T2), &PluginSettings::default())
        .await
        .unwrap();

    assert_eq!(ids(&resolved), vec![d.id, c.id]);
}

#[tokio::test]
async fn test_fallback_orders_by_position_then_name() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    let global = insert(&services, scoped("Global", None, None)).await;
    let project = insert(&services, scoped("Project", Some(P1), None)).await;

    let resolved = services
        .resolver
        .resolve_creation(Some(P1), None, &PluginSettings::default())
        .await
        .unwrap();

    // The global template was created first, so it sorts first
    assert_eq!(ids(&resolved), vec![global.id, project.id]);
}

#[tokio::test]
async fn test_global_tracker_tier_used_without_project_match() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    let tracker_wide = insert(&services, scoped("Tracker wide", None, Some(T1))).await;
    insert(&services, scoped("Project only", Some(P1), None)).await;
    insert(&services, scoped("Global", None, None)).await;

    let with_project = services
        .resolver
        .resolve_creation(Some(P1), Some(T1), &PluginSettings::default())
        .await
        .unwrap();
    assert_eq!(ids(&with_project), vec![tracker_wide.id]);

    let without_project = services
        .resolver
        .resolve_creation(None, Some(T1), &PluginSettings::default())
        .await
        .unwrap();
    assert_eq!(ids(&without_project), vec![tracker_wide.id]);
}

#[tokio::test]
async fn test_no_context_returns_fully_global_only() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    let global = insert(&services, scoped("Global", None, None)).await;
    insert(&services, scoped("Project", Some(P1), None)).await;
    insert(&services, scoped("Tracker", None, Some(T1))).await;

    let resolved = services
        .resolver
        .resolve_creation(None, None, &PluginSettings::default())
        .await
        .unwrap();

    assert_eq!(ids(&resolved), vec![global.id]);
}

#[tokio::test]
async fn test_disabled_templates_never_resolve() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    insert(
        &services,
        NewIssueTemplate {
            enabled: false,
            ..scoped("Disabled specific", Some(P1), Some(T1))
        },
    )
    .await;
    let fallback = insert(&services, scoped("Fallback", None, None)).await;
    insert(
        &services,
        NewIssueTemplate {
            enabled: false,
            ..scoped("Disabled global", None, None)
        },
    )
    .await;

    let resolved = services
        .resolver
        .resolve_creation(Some(P1), Some(T1), &PluginSettings::default())
        .await
        .unwrap();

    assert_eq!(ids(&resolved), vec![fallback.id]);
}

#[tokio::test]
async fn test_disabled_in_settings_resolves_nothing() {
    let db = setup_test_db().await;
    let services = build_services(&db);
    insert(&services, scoped("Global", None, None)).await;

    let settings = PluginSettings {
        creation_templates_enabled: false,
        ..PluginSettings::default()
    };

    let resolved = services
        .resolver
        .resolve_creation(None, None, &settings)
        .await
        .unwrap();

    assert!(resolved.is_empty());
}
