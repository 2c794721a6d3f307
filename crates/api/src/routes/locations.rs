use axum::{
    extract::Query,
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use common::locations;

use crate::{auth::require_auth, ApiError, AppState};

pub fn locations_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/locations", get(get_locations))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

#[derive(Deserialize)]
struct LocationsQuery {
    region: Option<String>,
}

/// Every region, or just the one named by `?region=`.
async fn get_locations(Query(q): Query<LocationsQuery>) -> Result<Json<Value>, ApiError> {
    let regions = match q.region.as_deref() {
        Some(name) => {
            let region = locations::region(name).ok_or_else(|| {
                ApiError::new(StatusCode::NOT_FOUND, format!("unknown region: {name}"))
            })?;
            std::slice::from_ref(region)
        }
        None => locations::regions(),
    };
    Ok(Json(json!({
        "success": true,
        "regions": regions,
    })))
}
