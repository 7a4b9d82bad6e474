//! Connection - one bridge session.
//!
//! Lines are read through a `LinesCodec`. Each decoded event is dispatched
//! on its own task, so a slow stock write never stalls the reader; replies
//! funnel through an mpsc queue into the single writer half. Replies may
//! therefore arrive out of order and carry `reply_to` for correlation.

use crate::handlers::Registry;
use crate::network::protocol::{Event, Reply};
use crate::state::BotState;
use crate::telemetry::spans;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{Instrument, debug, warn};

/// Replies buffered before event tasks wait on the writer.
const OUTGOING_QUEUE: usize = 64;

/// A bridge connection handler.
pub struct Connection {
    id: String,
    addr: SocketAddr,
    stream: TcpStream,
    state: Arc<BotState>,
    registry: Arc<Registry>,
    max_line_len: usize,
}

impl Connection {
    pub fn new(
        id: String,
        stream: TcpStream,
        addr: SocketAddr,
        state: Arc<BotState>,
        registry: Arc<Registry>,
        max_line_len: usize,
    ) -> Self {
        Self {
            id,
            addr,
            stream,
            state,
            registry,
            max_line_len,
        }
    }

    /// Run until the bridge disconnects.
    pub async fn run(self) -> anyhow::Result<()> {
        let span = spans::connection(&self.id, &self.addr.to_string());
        self.serve().instrument(span).await
    }

    async fn serve(self) -> anyhow::Result<()> {
        let framed = Framed::new(self.stream, LinesCodec::new_with_max_length(self.max_line_len));
        let (mut sink, mut lines) = framed.split();
        let (tx, mut rx) = mpsc::channel::<Reply>(OUTGOING_QUEUE);

        let writer = tokio::spawn(
            async move {
                while let Some(reply) = rx.recv().await {
                    let line = match reply.to_line() {
                        Ok(line) => line,
                        Err(e) => {
                            warn!(error = %e, "Failed to encode reply");
                            continue;
                        }
                    };
                    if let Err(e) = sink.send(line).await {
                        warn!(error = %e, "Failed to write reply");
                        break;
                    }
                }
            }
            .in_current_span(),
        );

        while let Some(next) = lines.next().await {
            let line = match next {
                Ok(line) => line,
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    warn!(limit = self.max_line_len, "Event line too long");
                    let _ = tx.send(Reply::bad_request("line too long")).await;
                    continue;
                }
                Err(LinesCodecError::Io(e)) => {
                    drop(tx);
                    let _ = writer.await;
                    return Err(e.into());
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            let event = match Event::from_line(&line) {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "Malformed event");
                    let _ = tx.send(Reply::bad_request(e.to_string())).await;
                    continue;
                }
            };

            let state = Arc::clone(&self.state);
            let registry = Arc::clone(&self.registry);
            let tx = tx.clone();
            tokio::spawn(
                async move {
                    if let Some(reply) = registry.dispatch(&state, &event).await
                        && tx.send(reply).await.is_err()
                    {
                        debug!(event = %event.id(), "Connection closed before reply was sent");
                    }
                }
                .in_current_span(),
            );
        }

        // Let in-flight event tasks finish writing before closing.
        drop(tx);
        let _ = writer.await;
        Ok(())
    }
}
