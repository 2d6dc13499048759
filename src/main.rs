//! Brand news monitor HTTP entrypoint.
//! Boots the Axum router over a pipeline built from `config/monitor.toml`.

use std::sync::Arc;

use brand_news_monitor::api::{self, AppState, RequestDefaults};
use brand_news_monitor::metrics::Metrics;
use brand_news_monitor::{init_tracing, Monitor, MonitorConfig};
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = MonitorConfig::load_default().map_err(shuttle_runtime::Error::Custom)?;

    let metrics = match Metrics::init(cfg.http_timeout_secs) {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = %e, "metrics disabled");
            None
        }
    };

    let monitor = Monitor::from_config(&cfg);
    tracing::info!(sources = ?monitor.adapter_names(), "monitor ready");

    let state = AppState {
        monitor: Arc::new(monitor),
        defaults: Arc::new(RequestDefaults::from(&cfg)),
        metrics,
    };

    Ok(api::router(state).into())
}
