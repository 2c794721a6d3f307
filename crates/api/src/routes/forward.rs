use axum::{
    extract::{Query, State},
    middleware,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use common::{locations, Error};

use crate::{auth::require_auth, ApiError, AppState};

pub fn forward_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/forward-location", get(get_forward_location))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

#[derive(Deserialize)]
struct ForwardQuery {
    issue_date: Option<String>,
    location: Option<String>,
}

/// One day's curve for one location, straight from the provider.
async fn get_forward_location(
    State(state): State<AppState>,
    Query(q): Query<ForwardQuery>,
) -> Result<Json<Value>, ApiError> {
    let (Some(issue_date), Some(location)) = (q.issue_date, q.location) else {
        return Err(Error::InvalidRequest("issue_date and location are required".into()).into());
    };
    let issue_date = strips::parse_date(&issue_date)?;
    let location = locations::find(&location).ok_or(Error::UnknownLocation(location))?;

    debug!(%issue_date, location = %location.name, "Forward curve lookup");
    let curve = state.provider.forward_curve(issue_date, &location.name).await?;

    Ok(Json(json!({
        "success": true,
        "issue_date": curve.issue_date,
        "location": curve.location,
        "contracts": curve.contracts,
        "fixed_prices": curve.fixed_prices,
        "basis_prices": curve.basis_prices,
    })))
}
