//! Error types for kakeibo-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kakeibo_core::{CoreError, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Core(e) => match e.code() {
                ErrorCode::SourceNotFound => StatusCode::NOT_FOUND,
                ErrorCode::InvalidFormat | ErrorCode::NoBalance => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ErrorCode::IoError => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Core(e) => serde_json::json!({
                "success": false,
                "error": e.to_details(),
            }),
            other => serde_json::json!({
                "success": false,
                "message": other.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
