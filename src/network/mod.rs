//! Network module.
//!
//! Contains the Gateway (TCP listener), Connection handler, and the bridge
//! wire format.

mod connection;
mod gateway;
pub mod protocol;

pub use connection::Connection;
pub use gateway::Gateway;
