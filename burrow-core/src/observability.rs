//! Observability infrastructure: tracing and metrics.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the Prometheus listener address.
/// Metrics are recorded regardless; without this, they are not exported.
pub const METRICS_ADDR_ENV_VAR: &str = "BURROW_METRICS_ADDR";

/// Initialize the global observability infrastructure.
///
/// Must be called once at process startup. Log verbosity follows
/// `RUST_LOG`, defaulting to INFO.
pub fn init() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_target(true).with_level(true))
        .init();

    if let Ok(addr) = std::env::var(METRICS_ADDR_ENV_VAR) {
        let addr: SocketAddr = addr.parse()?;
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        tracing::info!("Prometheus exporter listening on {}", addr);
    }

    Ok(())
}
