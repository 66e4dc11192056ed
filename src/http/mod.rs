//! HTTP server module.
//!
//! The server includes:
//! - Plain HTTP listener on the configured host and port
//! - Graceful shutdown on SIGTERM/SIGINT, draining in-flight updates

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
