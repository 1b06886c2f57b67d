//! Error types for the handout server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::layout::{ComposeError, GridError};
use crate::pdf::PdfError;

/// Application error type covering the whole HTTP surface.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No file part")]
    MissingFilePart,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Invalid file type")]
    InvalidFileType,

    #[error("Failed to parse PDF: {0}")]
    InvalidPdf(String),

    #[error("Upload not found: {0}")]
    UploadNotFound(Uuid),

    #[error("No slides selected")]
    EmptySelection,

    #[error("Selected slide {page} is out of range (1-{total})")]
    PageOutOfRange { page: u32, total: usize },

    #[error(transparent)]
    InvalidGrid(#[from] GridError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("Compose error: {0}")]
    Compose(#[from] ComposeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match &self {
            AppError::MissingFilePart
            | AppError::EmptyFilename
            | AppError::InvalidFileType
            | AppError::EmptySelection => (StatusCode::BAD_REQUEST, self.to_string(), None),

            AppError::PageOutOfRange { .. } => (StatusCode::BAD_REQUEST, self.to_string(), None),

            AppError::InvalidGrid(e) => (StatusCode::BAD_REQUEST, e.to_string(), None),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),

            AppError::InvalidPdf(detail) => (
                StatusCode::BAD_REQUEST,
                "Failed to parse PDF".to_string(),
                Some(detail.clone()),
            ),

            AppError::UploadNotFound(id) => {
                tracing::debug!("process request for unknown upload {}", id);
                (StatusCode::NOT_FOUND, "Upload not found".to_string(), None)
            }

            // A page the route validation missed would still surface from the
            // compositor; keep it a client error.
            AppError::Compose(ComposeError::Pdf(PdfError::PageOutOfRange { page, total })) => (
                StatusCode::BAD_REQUEST,
                format!("Selected slide {} is out of range (1-{})", page, total),
                None,
            ),

            AppError::Pdf(PdfError::PageOutOfRange { page, total }) => (
                StatusCode::BAD_REQUEST,
                format!("Selected slide {} is out of range (1-{})", page, total),
                None,
            ),

            AppError::Compose(e) => {
                tracing::error!("compose failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(e.to_string()),
                )
            }

            AppError::Pdf(e) => {
                tracing::error!("PDF operation failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(e.to_string()),
                )
            }

            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(e.to_string()),
                )
            }

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(msg.clone()),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            details,
        });

        (status, body).into_response()
    }
}
