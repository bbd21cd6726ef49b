//! Market Trend Report — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and metrics.

use market_trend_report::{app_state_from_env, create_router, metrics::Metrics};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs, filtered by RUST_LOG (default: info for this crate, warn elsewhere).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("market_trend_report=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let state = app_state_from_env()?;
    let metrics = Metrics::init()?;

    let router = create_router(state).merge(metrics.router());
    Ok(router.into())
}
