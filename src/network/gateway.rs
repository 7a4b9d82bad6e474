//! Gateway - TCP listener that accepts bridge connections.
//!
//! The Gateway binds the listen socket and spawns a [`Connection`] task for
//! each accepted bridge, after the per-IP connection rate check.

use crate::config::ListenConfig;
use crate::handlers::Registry;
use crate::network::Connection;
use crate::state::BotState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// How often the rate limiter table is pruned.
const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// The Gateway accepts incoming bridge connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    state: Arc<BotState>,
    registry: Arc<Registry>,
    max_line_len: usize,
}

impl Gateway {
    /// Bind the gateway to the configured address.
    pub async fn bind(config: &ListenConfig, state: Arc<BotState>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.address).await?;
        info!(address = %listener.local_addr()?, "Bridge listener bound");

        Ok(Self {
            listener,
            state,
            registry: Arc::new(Registry::new()),
            max_line_len: config.max_line_len,
        })
    }

    /// Address actually bound, useful when the configured port was 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(LIMITER_CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                state.connection_limiter.cleanup();
            }
        });

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    if !self.state.connection_limiter.check_connection_rate(addr.ip()) {
                        warn!(%addr, "Connection rate limit exceeded - rejecting");
                        crate::metrics::record_rate_limited();
                        drop(stream);
                        continue;
                    }

                    let conn_id = Uuid::new_v4().to_string();
                    info!(%addr, conn = %conn_id, "Bridge connection accepted");

                    let connection = Connection::new(
                        conn_id.clone(),
                        stream,
                        addr,
                        Arc::clone(&self.state),
                        Arc::clone(&self.registry),
                        self.max_line_len,
                    );

                    tokio::spawn(async move {
                        if let Err(e) = connection.run().await {
                            error!(conn = %conn_id, %addr, error = %e, "Connection error");
                        }
                        info!(conn = %conn_id, %addr, "Bridge connection closed");
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}
