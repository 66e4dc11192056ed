//! Webhook route that accepts status updates.

use std::io;

use axum::{body::Bytes, extract::State, http::StatusCode};

use crate::error::UpdateError;
use crate::state::AppState;

/// Status update handler.
///
/// Hands the raw body to the updater on the blocking pool, since the update
/// performs synchronous file I/O. The blocking closure re-enters the request
/// span so the updater's events keep the request ID. Success is `200 OK`
/// with an empty body.
pub async fn update(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, UpdateError> {
    tracing::debug!(bytes = body.len(), "Received status update");

    let updater = state.updater.clone();
    let span = tracing::Span::current();
    match tokio::task::spawn_blocking(move || span.in_scope(|| updater.handle(&body))).await {
        Ok(result) => result.map(|_| StatusCode::OK),
        Err(join_err) => {
            let err = UpdateError::Unexpected(io::Error::other(join_err));
            state.updater.record_failure(&err);
            Err(err)
        }
    }
}
