//! accgen - account distribution bot core.
//!
//! Hands out username/password pairs from a shared stock under per-user
//! cooldowns and daily limits, lets privileged members restock from pasted
//! text, and reformats credential templates posted in chat. A chat platform
//! bridge talks to it over newline-delimited JSON.

pub mod config;
pub mod credential;
pub mod error;
pub mod handlers;
pub mod http;
pub mod metrics;
pub mod network;
pub mod quota;
pub mod roles;
pub mod security;
pub mod state;
pub mod stock;
pub mod telemetry;
