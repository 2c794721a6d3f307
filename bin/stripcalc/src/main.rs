use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use common::{Config, CurveSource, ForwardCurveProvider};
use engine::NgiClient;
use replay::ReplayProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(
        port = cfg.dashboard_port,
        default_num_strips = cfg.default_num_strips,
        "Stripcalc starting"
    );

    // ── Forward curve provider (injected based on CURVE_SOURCE) ───────────────
    let provider: Arc<dyn ForwardCurveProvider> = match &cfg.curve_source {
        CurveSource::Ngi {
            base_url,
            email,
            api_key,
        } => {
            info!(%base_url, "Live datafeed, using NgiClient");
            Arc::new(
                NgiClient::new(base_url, email, api_key, cfg.http_timeout)
                    .context("building NGI client")?,
            )
        }
        CurveSource::Replay { path } => {
            info!(%path, "Replaying recorded curves, using ReplayProvider");
            let replay = ReplayProvider::from_json_file(path)
                .with_context(|| format!("loading replay file {path}"))?;
            if replay.is_empty().await {
                warn!("Replay file holds no curves; every calculation will come back empty");
            } else {
                info!(curves = replay.len().await, "Replay curves ready");
            }
            Arc::new(replay)
        }
    };

    // ── API ───────────────────────────────────────────────────────────────────
    let api_state = api::AppState::new(
        provider,
        cfg.dashboard_token.clone(),
        cfg.default_num_strips,
    );
    let port = cfg.dashboard_port;
    let server = tokio::spawn(async move {
        if let Err(e) = api::serve(api_state, port).await {
            error!(error = %e, "API server stopped");
        }
    });

    info!("Waiting for shutdown signal.");
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for ctrl-c")?;
            info!("Shutdown signal received. Exiting.");
        }
        _ = server => {
            warn!("API server exited; shutting down");
        }
    }
    Ok(())
}
