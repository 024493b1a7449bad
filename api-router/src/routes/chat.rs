use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

/// Answers a question against the ingested content.
pub async fn chat(
    State(state): State<ApiState>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.answerer.answer(&payload.query).await?;

    Ok((StatusCode::OK, Json(response)))
}
