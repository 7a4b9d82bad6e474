//! accgend - bridge-facing daemon for the accgen bot.

use accgen::config::{Config, validation};
use accgen::credential::Detector;
use accgen::network::Gateway;
use accgen::quota::SystemClock;
use accgen::state::BotState;
use accgen::stock::Stock;
use accgen::{http, metrics};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validation::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        listen = %config.listen.address,
        backend = ?config.stock.backend,
        prefix = %config.bot.command_prefix,
        "Starting accgen"
    );

    // Metrics are registered before the stock opens so the first size
    // reading lands in the gauge.
    // Convention: metrics_port = 0 disables the HTTP endpoint.
    let metrics_port = config.server.effective_metrics_port();
    if metrics_port == 0 {
        info!("Metrics disabled");
    } else {
        metrics::init();
        info!("Metrics initialized");
    }

    let stock = Stock::open(&config.stock).await.map_err(|e| {
        error!(path = %config.stock.path, error = %e, "Failed to open stock");
        e
    })?;

    let detector = Detector::new()?;
    let state = Arc::new(BotState::new(&config, stock, detector, Arc::new(SystemClock)));

    if metrics_port != 0 {
        let http_state = Arc::clone(&state);
        tokio::spawn(async move {
            http::run_http_server(metrics_port, http_state).await;
        });
        info!(port = metrics_port, "Status HTTP server started");
    }

    let gateway = Gateway::bind(&config.listen, state).await?;

    tokio::select! {
        result = gateway.run() => result?,
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Shutdown requested"),
                Err(e) => warn!(error = %e, "Failed to listen for shutdown signal"),
            }
        }
    }

    Ok(())
}
