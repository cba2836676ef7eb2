use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors render in the same `{isError, errorMessage}` shape as a failed
/// preview so the UI has a single error path.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message): (StatusCode, String) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (
            status,
            Json(json!({ "isError": true, "errorMessage": message })),
        )
            .into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
