use crate::infrastructure::http::controllers::{
    health, issue_templates, settings, template_content,
};
use crate::infrastructure::http::middleware::{require_admin, resolve_caller, AppState};
use axum::{
    routing::{get, patch},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn build_router(state: AppState) -> Router {
    // Template administration
    let admin = Router::new()
        .route(
            "/issue_templates",
            get(issue_templates::list_templates).post(issue_templates::create_template),
        )
        .route(
            "/issue_templates/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route(
            "/issue_templates/:id",
            get(issue_templates::get_template)
                .patch(issue_templates::update_template)
                .delete(issue_templates::delete_template),
        )
        .route(
            "/issue_templates/:id/reorder",
            patch(issue_templates::reorder_template),
        )
        .route_layer(axum::middleware::from_fn(require_admin));

    // Content endpoint used by the issue forms
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/issue_templates/get_templates",
            get(template_content::get_templates),
        );

    Router::new()
        .merge(admin)
        .merge(public)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            resolve_caller,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
