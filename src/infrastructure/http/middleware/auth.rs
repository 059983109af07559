use crate::application::services::{
    PositionService, SettingsService, TemplateResolver, TemplateService,
};
use crate::domain::entities::Caller;
use crate::infrastructure::http::middleware::error::ApiError;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Header carrying the host application's user id
pub const REMOTE_USER_HEADER: &str = "X-Remote-User-Id";

#[derive(Clone)]
pub struct AppState {
    pub admin_api_token: Arc<str>,
    pub template_service: TemplateService,
    pub template_resolver: TemplateResolver,
    pub position_service: PositionService,
    pub settings_service: SettingsService,
}

/// Work out who is calling from the request headers.
///
/// A bearer token equal to the configured admin token makes the caller an
/// administrator. Anything else is treated as a regular (possibly anonymous)
/// host user.
pub fn caller_from_headers(headers: &HeaderMap, admin_api_token: &str) -> Caller {
    let is_admin = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.trim() == admin_api_token)
        .unwrap_or(false);

    let user_id = headers
        .get(REMOTE_USER_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok());

    Caller { user_id, is_admin }
}

/// Attach the `Caller` to every request
pub async fn resolve_caller(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let caller = caller_from_headers(request.headers(), &state.admin_api_token);
    request.extensions_mut().insert(caller);
    next.run(request).await
}

/// Reject non-administrators before they reach template management
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let caller = request
        .extensions()
        .get::<Caller>()
        .cloned()
        .unwrap_or_default();

    if caller.is_admin {
        return Ok(next.run(request).await);
    }

    if caller.user_id.is_none() {
        return Err(ApiError::Unauthorized);
    }

    tracing::warn!(
        "Permission denied: user {:?} attempted template administration",
        caller.user_id
    );
    Err(ApiError::Forbidden(
        "Administrator permission required".to_string(),
    ))
}
