use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use ingestion_pipeline::utils::image_ocr::extract_image_text;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError, routes};

#[derive(Debug, TryFromMultipart)]
pub struct UploadParams {
    #[form_data(limit = "unlimited")]
    pub file: FieldData<NamedTempFile>,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub message: String,
    pub text_snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

/// Accepts a document image, runs OCR and ingests the extracted text into
/// the vector index.
pub async fn post_image(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<UploadParams>,
) -> Result<impl IntoResponse, ApiError> {
    let file_name = input.file.metadata.file_name.clone();
    let stored = routes::store_upload(
        &state.config.data_dir,
        &input.file,
        &routes::IMAGE_EXTENSIONS,
        ".jpg",
    )
    .await?;

    let extracted_text = extract_image_text(
        &stored,
        &state.openai_client,
        &state.config.vision_model,
        Duration::from_secs(state.config.external_timeout_secs),
    )
    .await?;

    let result = state
        .pipeline
        .ingest(&extracted_text, file_name.as_deref())
        .await?;

    info!(
        chunks_added = result.chunks_added,
        extracted_chars = extracted_text.len(),
        "Processed uploaded document"
    );

    Ok((
        StatusCode::OK,
        Json(DocumentResponse {
            message: "Uploaded file processed successfully and content embedded.".to_string(),
            text_snippet: routes::text_snippet(&extracted_text, "No text extracted from document."),
            image_path: Some(stored.display().to_string()),
        }),
    ))
}
