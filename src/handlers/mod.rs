//! Event handlers.
//!
//! Every slash command is a [`Handler`] registered by name in the
//! [`Registry`]. Handlers return a structured [`Outcome`](crate::network::protocol::Outcome)
//! on success; denials and failures travel as
//! [`HandlerError`](crate::error::HandlerError) and are turned into outcomes by the
//! registry, which also records metrics for them.
//!
//! - `generate` - quota-gated dispensing of one account
//! - `restock` - role-gated bulk append of parsed credentials
//! - `stock` - pool size report
//! - `format` - explicit template reformatting
//!
//! Plain messages are handled in [`message`]: text commands first, then
//! passive template detection.

mod core;
mod format;
mod generate;
pub mod message;
mod restock;
mod stock;

pub use core::{Context, Handler, Registry};
pub use format::FormatHandler;
pub use generate::GenerateHandler;
pub use restock::RestockHandler;
pub use stock::StockHandler;
