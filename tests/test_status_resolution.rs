mod helpers;

use helpers::*;
use issue_templates::domain::entities::{NewIssueTemplate, PluginSettings};

const P1: i64 = 1;
const S1: i64 = 3;
const S2: i64 = 4;

fn for_status(name: &str, project_id: Option<i64>, status: Option<i64>, is_global: bool) -> NewIssueTemplate {
    NewIssueTemplate {
        project_id,
        issue_status_id: status,
        is_global,
        ..status_change(name)
    }
}

#[tokio::test]
async fn test_unions_global_and_project_templates() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    let e = insert(&services, for_status("E", None, Some(S1), true)).await;
    let f = insert(&services, for_status("F", Some(P1), Some(S1), false)).await;

    let resolved = services
        .resolver
        .resolve_status_change(Some(P1), S1, &PluginSettings::default())
        .await
        .unwrap();

    assert_eq!(ids(&resolved), vec![e.id, f.id]);
}

#[tokio::test]
async fn test_project_part_does_not_depend_on_global_part() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    let f = insert(&services, for_status("F", Some(P1), Some(S1), false)).await;

    let resolved = services
        .resolver
        .resolve_status_change(Some(P1), S1, &PluginSettings::default())
        .await
        .unwrap();
    assert_eq!(ids(&resolved), vec![f.id]);

    let without_project = services
        .resolver
        .resolve_status_change(None, S1, &PluginSettings::default())
        .await
        .unwrap();
    assert!(without_project.is_empty());
}

#[tokio::test]
async fn test_null_status_matches_any_status() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    let any_status = insert(&services, for_status("Any", None, None, true)).await;
    insert(&services, for_status("Other status", None, Some(S2), true)).await;

    let resolved = services
        .resolver
        .resolve_status_change(None, S1, &PluginSettings::default())
        .await
        .unwrap();

    assert_eq!(ids(&resolved), vec![any_status.id]);
}

#[tokio::test]
async fn test_non_global_unscoped_template_is_not_global() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    // No project and no global flag: not part of either half of the union
    insert(&services, for_status("Loose", None, Some(S1), false)).await;

    let resolved = services
        .resolver
        .resolve_status_change(Some(P1), S1, &PluginSettings::default())
        .await
        .unwrap();

    assert!(resolved.is_empty());
}

#[tokio::test]
async fn test_global_project_template_is_not_duplicated() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    let both = insert(&services, for_status("Both", Some(P1), Some(S1), true)).await;

    let resolved = services
        .resolver
        .resolve_status_change(Some(P1), S1, &PluginSettings::default())
        .await
        .unwrap();

    assert_eq!(ids(&resolved), vec![both.id]);
}

#[tokio::test]
async fn test_disabled_templates_excluded() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    insert(
        &services,
        NewIssueTemplate {
            enabled: false,
            ..for_status("Disabled", None, Some(S1), true)
        },
    )
    .await;

    let resolved = services
        .resolver
        .resolve_status_change(Some(P1), S1, &PluginSettings::default())
        .await
        .unwrap();

    assert!(resolved.is_empty());
}

#[tokio::test]
async fn test_disabled_in_settings_resolves_nothing() {
    let db = setup_test_db().await;
    let services = build_services(&db);
    insert(&services, for_status("E", None, Some(S1), true)).await;

    let settings = PluginSettings {
        status_templates_enabled: false,
        ..PluginSettings::default()
    };

    let resolved = services
        .resolver
        .resolve_status_change(None, S1, &settings)
        .await
        .unwrap();

    assert!(resolved.is_empty());
}

#[tokio::test]
async fn test_project_template_without_status_needs_exact_status() {
    let db = setup_test_db().await;
    let services = build_services(&db);

    insert(&services, for_status("Any status", Some(P1), None, false)).await;
    let exact = insert(&services, for_status("Exact", Some(P1), Some(S2), false)).await;

    let for_s1 = services
        .resolver
        .resolve_status_change(Some(P1), S1, &PluginSettings::default())
        .await
        .unwrap();
    assert!(for_s1.is_empty());

    let for_s2 = services
        .resolver
        .resolve_status_change(Some(P1), S2, &PluginSettings::default())
        .await
        .unwrap();
    assert_eq!(ids(&for_s2), vec![exact.id]);
}
