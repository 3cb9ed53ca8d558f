use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No Employee found for current user")]
    NoEmployee,

    #[error("This Timesheet is already submitted.")]
    AlreadySubmitted,

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoEmployee => StatusCode::FORBIDDEN,
            AppError::AlreadySubmitted => StatusCode::CONFLICT,
            AppError::InvalidDate(_) | AppError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(StoreError::Conflict(_) | StoreError::NotEditable(_)) => {
                StatusCode::CONFLICT
            }
            AppError::Store(StoreError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Store(StoreError::Database(e)) => {
                tracing::error!(error = %e, "Timesheet store failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
