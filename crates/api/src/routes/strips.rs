use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use common::{locations, CalculationRequest, Error, PriceType, RunProgress};
use engine::{export, BatchRunner};

use crate::{auth::require_auth, ApiError, AppState};

pub fn strips_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/strips", post(start_calculation))
        .route("/api/strips/cancel", post(cancel_calculation))
        .route("/api/strips/status", get(get_status))
        .route("/api/strips/result", get(get_result))
        .route("/api/strips/table", get(get_table))
        .route("/api/strips/export", get(get_export))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

// ─── Start / cancel ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StartBody {
    location: String,
    start_date: String,
    end_date: String,
    #[serde(default)]
    price_type: Option<String>,
    #[serde(default)]
    num_strips: Option<usize>,
}

impl StartBody {
    fn into_request(self, default_num_strips: usize) -> Result<CalculationRequest, Error> {
        let location = locations::find(&self.location)
            .ok_or_else(|| Error::UnknownLocation(self.location.clone()))?;
        let price_type = match self.price_type.as_deref() {
            Some(p) => p.parse()?,
            None => PriceType::default(),
        };
        let num_strips = self.num_strips.unwrap_or(default_num_strips);
        if num_strips == 0 {
            return Err(Error::InvalidRequest("num_strips must be at least 1".into()));
        }
        let start_date = strips::parse_date(&self.start_date)?;
        let end_date = strips::parse_date(&self.end_date)?;
        if start_date > end_date {
            return Err(Error::InvalidDate(format!(
                "start date {start_date} is after end date {end_date}"
            )));
        }
        Ok(CalculationRequest {
            location: location.name.clone(),
            start_date,
            end_date,
            price_type,
            num_strips,
        })
    }
}

/// Validate the request and run it in the background. Only one calculation
/// runs at a time.
async fn start_calculation(
    State(state): State<AppState>,
    body: Result<Json<StartBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.body_text()))?;
    let request = body.into_request(state.default_num_strips)?;

    let mut slot = state.runs.write().await;
    if slot.is_active().await {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            "a calculation is already running",
        ));
    }

    let (runner, handle) = BatchRunner::new(state.provider.clone(), request);
    let run_id = runner.run_id();
    slot.run_id = Some(run_id);
    slot.handle = Some(handle);
    slot.report = None;
    slot.partial = false;
    drop(slot);

    info!(%run_id, "Calculation accepted");
    let runs = state.runs.clone();
    tokio::spawn(async move {
        let outcome = runner.run().await;
        let mut slot = runs.write().await;
        if slot.run_id != Some(run_id) {
            return;
        }
        match outcome {
            Ok(report) => slot.report = Some(report),
            Err(Error::Cancelled { partial }) if !partial.data.is_empty() => {
                slot.report = Some(*partial);
                slot.partial = true;
            }
            Err(_) => {}
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "success": true, "run_id": run_id })),
    ))
}

async fn cancel_calculation(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let slot = state.runs.read().await;
    let active = slot.is_active().await;
    match &slot.handle {
        Some(handle) if active => {
            handle.cancel();
            Ok(Json(json!({ "success": true })))
        }
        _ => {
            warn!("Cancel requested with no calculation running");
            Err(ApiError::new(StatusCode::CONFLICT, "no calculation is running"))
        }
    }
}

// ─── Progress and results ─────────────────────────────────────────────────────

async fn get_status(State(state): State<AppState>) -> Json<Value> {
    let slot = state.runs.read().await;
    let progress = match &slot.handle {
        Some(h) => h.progress().await,
        None => RunProgress::default(),
    };
    Json(json!({
        "success": true,
        "progress": progress,
        "has_result": slot.report.is_some(),
        "partial": slot.partial,
    }))
}

async fn get_result(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let slot = state.runs.read().await;
    let report = slot.report.as_ref().ok_or_else(no_result)?;
    Ok(Json(json!({
        "success": true,
        "partial": slot.partial,
        "report": report,
    })))
}

/// Tab-separated table for pasting into a spreadsheet.
async fn get_table(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let slot = state.runs.read().await;
    let report = slot.report.as_ref().ok_or_else(no_result)?;
    Ok((
        [(header::CONTENT_TYPE, "text/tab-separated-values; charset=utf-8")],
        export::clipboard_table(report),
    ))
}

#[derive(Deserialize)]
struct ExportQuery {
    sheet: Option<String>,
}

/// One workbook sheet as CSV: `summary` (the default) or a strip name.
async fn get_export(
    State(state): State<AppState>,
    Query(q): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let slot = state.runs.read().await;
    let report = slot.report.as_ref().ok_or_else(no_result)?;

    let sheet = q.sheet.unwrap_or_else(|| "summary".to_string());
    let (file, body) = if sheet.eq_ignore_ascii_case("summary") {
        ("Summary".to_string(), export::summary_csv(report)?)
    } else {
        (export::sheet_name(&sheet), export::strip_sheet_csv(report, &sheet)?)
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file}.csv\""),
            ),
        ],
        body,
    ))
}

fn no_result() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "no calculation result available")
}
