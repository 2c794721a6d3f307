use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use crate::AppState;

/// Middleware that enforces bearer token authentication on all `/api` routes.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(t) if t == state.dashboard_token => next.run(request).await,
        _ => {
            debug!(path = %request.uri().path(), "Rejected unauthenticated request");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "error": "unauthorized" })),
            )
                .into_response()
        }
    }
}
