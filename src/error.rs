use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::chat::ChatError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing term")]
    MissingTerm,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Missing {0}")]
    MissingCredential(&'static str),
    #[error("Server error")]
    Generation(#[from] ChatError),
    #[error("Server error")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingTerm => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::MissingCredential(_) | AppError::Generation(_) | AppError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Generation(e) => tracing::error!("text generation failed: {e}"),
            AppError::MissingCredential(var) => tracing::error!("{var} is not configured"),
            _ => {}
        }
        let body = json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
