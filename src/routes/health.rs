//! Health check endpoint for process supervisors.
//!
//! Returns 200 OK whenever the process can answer HTTP. It does not touch the
//! status file.

/// Health check handler.
pub async fn health() -> &'static str {
    "ok"
}
