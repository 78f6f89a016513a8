//! motor-match: binary entrypoint.
//! Boots the Axum HTTP server with config, tracing and the Prometheus exporter.

use motor_match::{api, config::AppConfig, logging, metrics::Metrics};
use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    logging::init_tracing();

    let config = AppConfig::load_default()?;
    let metrics_enabled = config.metrics.enabled;
    let mut state = api::AppState::new(config);

    if metrics_enabled {
        match Metrics::init() {
            Ok(m) => state = state.with_metrics(m),
            Err(e) => warn!(error = %e, "metrics disabled"),
        }
    }

    info!(metrics = metrics_enabled, "motor-match router ready");
    let router = api::create_router(state);

    Ok(router.into())
}
