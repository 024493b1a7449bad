use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use common::{error::AppError, utils::llm::summarize_context};
use ingestion_pipeline::utils::audio_transcription::transcribe_audio_file;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError, routes};

const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "wav", "m4a", "ogg", "flac"];

#[derive(Debug, TryFromMultipart)]
pub struct AudioParams {
    #[form_data(limit = "unlimited")]
    pub file: FieldData<NamedTempFile>,
}

#[derive(Debug, Serialize)]
pub struct AudioResponse {
    pub message: String,
    pub summary: String,
}

/// Accepts an audio file, transcribes it, summarizes the transcript and
/// ingests it into the vector index so it can be queried later.
pub async fn post_audio(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<AudioParams>,
) -> Result<impl IntoResponse, ApiError> {
    let file_name = input.file.metadata.file_name.clone();

    // The transcription backend infers the codec from the file extension, so
    // the upload is restaged under a suffixed temp path. Dropped on return,
    // success or not.
    let ext = routes::upload_extension(file_name.as_deref(), &AUDIO_EXTENSIONS, ".mp3");
    let staged = tempfile::Builder::new()
        .suffix(&ext)
        .tempfile()
        .map_err(AppError::from)?;
    tokio::fs::copy(input.file.contents.path(), staged.path())
        .await
        .map_err(AppError::from)?;

    let staged_path = staged.path().to_string_lossy().into_owned();
    let transcript = transcribe_audio_file(
        &staged_path,
        &state.openai_client,
        &state.config.transcription_model,
        Duration::from_secs(state.config.external_timeout_secs),
    )
    .await?;

    let summary = summarize_context(&*state.completion_model, &transcript).await?;

    let result = state
        .pipeline
        .ingest(&transcript, file_name.as_deref())
        .await?;

    info!(
        transcript_chars = transcript.len(),
        chunks_added = result.chunks_added,
        "Processed audio upload"
    );

    Ok((
        StatusCode::OK,
        Json(AudioResponse {
            message: "Audio processed and summarized successfully.".to_string(),
            summary,
        }),
    ))
}
