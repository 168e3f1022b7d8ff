use crate::journal::JournalError;
use crate::models::ErrorResponse;
use crate::photo::ProcessError;
use crate::storage::StorageError;
use axum::{Json, http::StatusCode};

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<JournalError> for AppError {
    fn from(err: JournalError) -> Self {
        let status = match &err {
            JournalError::MissingPhoto | JournalError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            JournalError::AlreadyUploaded { .. } | JournalError::UploadInProgress => {
                StatusCode::CONFLICT
            }
            JournalError::Photo(ProcessError::Decode(_) | ProcessError::Empty) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            JournalError::Storage(StorageError::QuotaExceeded { .. }) => {
                StatusCode::INSUFFICIENT_STORAGE
            }
            JournalError::Photo(_) | JournalError::Storage(_) | JournalError::Worker(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = match &err {
            JournalError::Photo(ProcessError::Decode(_) | ProcessError::Empty) => {
                format!("That file could not be read as an image ({err}).")
            }
            JournalError::Storage(StorageError::QuotaExceeded { .. }) => {
                format!("Storage is full, the photo was not saved ({err}).")
            }
            _ => err.to_string(),
        };
        Self { status, message }
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        Self {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}
