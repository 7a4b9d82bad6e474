//! Operator HTTP endpoint.
//!
//! - `GET /metrics`: Prometheus text format
//! - `GET /status`: JSON snapshot of stock size and the quota and limiter table sizes

use crate::state::BotState;
use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug, Serialize)]
struct StatusSnapshot {
    /// `None` when the stock backend could not be read.
    stock: Option<usize>,
    tracked_users: usize,
    tracked_ips: usize,
}

async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

async fn status_handler(State(state): State<Arc<BotState>>) -> Json<StatusSnapshot> {
    let stock = match state.stock.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, "Status request could not count stock");
            None
        }
    };

    Json(StatusSnapshot {
        stock,
        tracked_users: state.quota.tracked_users(),
        tracked_ips: state.connection_limiter.tracked_ips(),
    })
}

pub fn router(state: Arc<BotState>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

/// Serve the endpoint on an already bound listener.
pub async fn serve(listener: TcpListener, state: Arc<BotState>) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

/// Bind `0.0.0.0:port` and serve until the process exits.
pub async fn run_http_server(port: u16, state: Arc<BotState>) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind HTTP server");
            return;
        }
    };
    tracing::info!(%addr, "Status HTTP server listening");

    if let Err(e) = serve(listener, state).await {
        tracing::error!(error = %e, "HTTP server error");
    }
}
