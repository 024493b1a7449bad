use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use ingestion_pipeline::utils::pdf_extraction::extract_pdf_text;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError, routes};

#[derive(Debug, TryFromMultipart)]
pub struct PdfParams {
    #[form_data(limit = "unlimited")]
    pub file: FieldData<NamedTempFile>,
}

#[derive(Debug, Serialize)]
pub struct PdfResponse {
    pub message: String,
    pub text_snippet: String,
    pub page_count: usize,
}

/// Accepts a PDF, extracts its text layer and ingests it into the vector
/// index. PDFs without extractable text are rejected with a 400.
pub async fn post_pdf_direct(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<PdfParams>,
) -> Result<impl IntoResponse, ApiError> {
    let file_name = input.file.metadata.file_name.clone();
    let pdf_bytes = tokio::fs::read(input.file.contents.path())
        .await
        .map_err(common::error::AppError::from)?;

    let (extracted_text, page_count) = extract_pdf_text(pdf_bytes).await?;

    if extracted_text.trim().is_empty() {
        return Err(ApiError::ValidationError(
            "No text could be extracted from the PDF.".to_string(),
        ));
    }

    let result = state
        .pipeline
        .ingest(&extracted_text, file_name.as_deref())
        .await?;

    info!(
        page_count,
        chunks_added = result.chunks_added,
        "Processed direct PDF upload"
    );

    Ok((
        StatusCode::OK,
        Json(PdfResponse {
            message: "PDF processed successfully, text extracted and embedded.".to_string(),
            text_snippet: routes::text_snippet(&extracted_text, "No text extracted from PDF."),
            page_count,
        }),
    ))
}
