//! Upload endpoint.
//!
//! POST /upload accepts a multipart form with a single `file` field holding
//! a PDF. The file is validated, stored under a fresh upload token, and the
//! token is returned together with the page count so the client can build
//! its slide picker.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::pdf;
use crate::state::AppState;
use crate::store::sanitize_filename;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub upload_id: Uuid,
    pub filename: String,
    pub total_pages: usize,
}

/// Handle a PDF upload: validate, count pages, store for later processing.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    // A request without a multipart body never carried a file part.
    let mut multipart = multipart.map_err(|_| AppError::MissingFilePart)?;

    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {}", e)))?;
            file = Some((filename, data.to_vec()));
            break;
        }
    }

    let (filename, data) = file.ok_or(AppError::MissingFilePart)?;
    if filename.is_empty() {
        return Err(AppError::EmptyFilename);
    }
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(AppError::InvalidFileType);
    }

    // Parsing is CPU-bound, keep it off the async runtime.
    let parse_data = data.clone();
    let total_pages = tokio::task::spawn_blocking(move || pdf::count_pages(&parse_data))
        .await
        .map_err(|e| AppError::Internal(format!("page count task failed: {}", e)))?
        .map_err(|e| AppError::InvalidPdf(e.to_string()))?;

    let entry = state
        .store()
        .save(&sanitize_filename(&filename), total_pages, &data)
        .await?;

    tracing::info!(
        upload_id = %entry.id,
        file = %entry.file_name,
        pages = total_pages,
        "PDF uploaded"
    );

    Ok(Json(UploadResponse {
        upload_id: entry.id,
        filename: entry.file_name,
        total_pages,
    }))
}
