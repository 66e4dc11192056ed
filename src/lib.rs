//! homestatus - home/away status webhook receiver
//!
//! Accepts POST requests from an automation service, checks that the body
//! carries the shared secret, and stores the raw body in a status file that
//! other processes read as the last-known state.

pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;
pub mod updater;

pub use error::UpdateError;
pub use updater::{StatusUpdater, Updated};
