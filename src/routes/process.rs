//! Handout processing endpoint.
//!
//! POST /process takes an upload token plus a grid request and responds with
//! the composed handout PDF as a download. The upload is claimed up front,
//! so it is gone after this request whether composition succeeds or not.

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use serde::de::{Deserializer, Error as _};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::layout::{compose_handout, GridShape};
use crate::pdf::SourceDocument;
use crate::state::AppState;

/// Filename offered in the Content-Disposition header.
const DOWNLOAD_NAME: &str = "processed_presentation.pdf";

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub upload_id: Uuid,
    #[serde(deserialize_with = "lenient_u32")]
    pub rows: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub cols: u32,
    #[serde(deserialize_with = "lenient_u32_list")]
    pub selected_slides: Vec<u32>,
}

// Form-driven clients send numbers as strings. Accept both shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientU32 {
    Number(u32),
    Text(String),
}

impl LenientU32 {
    fn parse(self) -> Result<u32, String> {
        match self {
            LenientU32::Number(n) => Ok(n),
            LenientU32::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| format!("invalid integer: {:?}", s)),
        }
    }
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    LenientU32::deserialize(deserializer)?
        .parse()
        .map_err(D::Error::custom)
}

fn lenient_u32_list<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<LenientU32>::deserialize(deserializer)?;
    values
        .into_iter()
        .map(|v| v.parse().map_err(D::Error::custom))
        .collect()
}

/// Compose the requested handout and stream it back as an attachment.
pub async fn process_handout(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    // Claim first: the upload is consumed no matter how this request ends.
    let claimed = state
        .store()
        .claim(&request.upload_id)
        .await
        .ok_or(AppError::UploadNotFound(request.upload_id))?;

    let grid = GridShape::new(request.rows, request.cols)?;

    if request.selected_slides.is_empty() {
        return Err(AppError::EmptySelection);
    }
    let total = claimed.page_count();
    for &page in &request.selected_slides {
        if page < 1 || page as usize > total {
            return Err(AppError::PageOutOfRange { page, total });
        }
    }

    tracing::info!(
        upload_id = %request.upload_id,
        file = %claimed.file_name(),
        rows = request.rows,
        cols = request.cols,
        slides = request.selected_slides.len(),
        "composing handout"
    );

    // Rendering and compositing are CPU-bound. The claim moves into the
    // closure, so the stored upload is deleted once composition finishes.
    let selection = request.selected_slides;
    let pdf_bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, AppError> {
        let source = SourceDocument::from_path(claimed.path())?;
        Ok(compose_handout(&source, grid, &selection)?)
    })
    .await
    .map_err(|e| AppError::Internal(format!("compose task failed: {}", e)))??;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", DOWNLOAD_NAME),
        )
        .body(Body::from(pdf_bytes))
        .unwrap();

    Ok(response)
}
