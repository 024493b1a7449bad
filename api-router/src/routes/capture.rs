use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use common::utils::llm::translate_context;
use ingestion_pipeline::utils::image_ocr::extract_image_text;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError, routes};

#[derive(Debug, TryFromMultipart)]
pub struct CaptureParams {
    #[form_data(limit = "unlimited")]
    pub file: FieldData<NamedTempFile>,
}

#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    pub message: String,
    pub translated_text: String,
    pub text_snippet: String,
    pub image_path: String,
}

/// Accepts a webcam capture, runs OCR and translates the result to English.
/// Captures are transient reading aids; they are not ingested into the
/// index.
pub async fn post_capture_image(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<CaptureParams>,
) -> Result<impl IntoResponse, ApiError> {
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

    let translated_text = if extracted_text.trim().is_empty() {
        String::new()
    } else {
        translate_context(&*state.completion_model, &extracted_text).await?
    };

    info!(
        extracted_chars = extracted_text.len(),
        translated_chars = translated_text.len(),
        "Processed captured image"
    );

    Ok((
        StatusCode::OK,
        Json(CaptureResponse {
            message: "Captured image processed and translated successfully.".to_string(),
            text_snippet: routes::text_snippet(
                &translated_text,
                "No text detected or translated from image.",
            ),
            translated_text,
            image_path: stored.display().to_string(),
        }),
    ))
}
