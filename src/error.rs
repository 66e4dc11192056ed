use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::io;

/// Why a status update was rejected. The `Display` text is both the
/// diagnostic log message and the response body.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("Submitted body {body} does not contain secret. -> Exit")]
    SecretMissing { body: String },

    #[error("Status File does not exist or is not readable!")]
    FileUnavailable,

    #[error("Status File is not writable!")]
    FileNotWritable,

    #[error("{0}")]
    Unexpected(#[from] io::Error),
}

impl UpdateError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UpdateError::SecretMissing { .. } => StatusCode::FORBIDDEN,
            UpdateError::FileUnavailable
            | UpdateError::FileNotWritable
            | UpdateError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UpdateError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Html(format!("{} <br>", self))).into_response()
    }
}
