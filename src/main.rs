//! Outreach Insights: binary entrypoint.
//! Boots the Axum HTTP server, wiring config, the upstream client, and
//! the Prometheus exporter.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use outreach_insights::api::{create_router, AppState};
use outreach_insights::config::{AppConfig, UPSTREAM_CACHE_TTL_SECS};
use outreach_insights::metrics::Metrics;
use outreach_insights::upstream::UpstreamClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("outreach_insights=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();

    let config = AppConfig::from_env();
    let metrics = Metrics::init(UPSTREAM_CACHE_TTL_SECS);

    let state = AppState {
        upstream: Arc::new(UpstreamClient::new(&config)),
        config: Arc::new(config.clone()),
    };
    let router = create_router(state).merge(metrics.router());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, workspace = config.default_workspace_id, "outreach-insights is listening");

    axum::serve(listener, router).await?;
    Ok(())
}
