mod auth;
mod error;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::sync::RwLock;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use uuid::Uuid;

use common::{ForwardCurveProvider, RunState, StripReport};
use engine::RunHandle;

pub use error::ApiError;

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ForwardCurveProvider>,
    pub dashboard_token: String,
    /// Used when a calculation request leaves `num_strips` out.
    pub default_num_strips: usize,
    pub runs: Arc<RwLock<RunSlot>>,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn ForwardCurveProvider>,
        dashboard_token: impl Into<String>,
        default_num_strips: usize,
    ) -> Self {
        Self {
            provider,
            dashboard_token: dashboard_token.into(),
            default_num_strips,
            runs: Arc::new(RwLock::new(RunSlot::default())),
        }
    }
}

/// The one calculation the server tracks: the latest run's handle and, once
/// it has ended, its report.
#[derive(Default)]
pub struct RunSlot {
    pub run_id: Option<Uuid>,
    pub handle: Option<RunHandle>,
    pub report: Option<StripReport>,
    /// The stored report holds only the rows gathered before a cancel.
    pub partial: bool,
}

impl RunSlot {
    pub async fn state(&self) -> RunState {
        match &self.handle {
            Some(h) => h.state().await,
            None => RunState::Idle,
        }
    }

    /// A run was started and has not reached a terminal state yet.
    pub async fn is_active(&self) -> bool {
        self.handle.is_some() && !self.state().await.is_finished()
    }
}

/// All routes with state applied. Split out from `serve` for tests.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_router())
        .merge(routes::locations_router(state.clone()))
        .merge(routes::forward_router(state.clone()))
        .merge(routes::strips_router(state.clone()))
        .with_state(state)
}

/// Build and run the Axum API server.
pub async fn serve(state: AppState, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    let app = router(state).layer(CompressionLayer::new()).layer(cors);

    info!(%addr, "Strip API listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
