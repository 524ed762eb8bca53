use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::views;

// Terminal errors. Anything that escapes the handler layer ends up here
// and is rendered through the generic error view; nothing runs after it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

// Implement IntoResponse to convert AppError into a rendered error page
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound => {
                tracing::debug!("no route matched");
                (StatusCode::NOT_FOUND, "Not Found".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, views::error_page(status, &message)).into_response()
    }
}

// From implementations for easy '?' conversion in handlers
impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        AppError::Internal(format!("session store: {e}"))
    }
}
