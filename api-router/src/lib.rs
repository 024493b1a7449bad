use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::post,
    Router,
};
use routes::{
    audio::post_audio, capture::post_capture_image, chat::chat, documents::post_image,
    pdf::post_pdf_direct,
};

pub mod api_state;
pub mod error;
mod routes;

/// Router for the ingestion and chat API.
pub fn api_routes<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    Router::new()
        .route("/post-image", post(post_image))
        .route("/post-capture-image", post(post_capture_image))
        .route("/post-pdf-direct", post(post_pdf_direct))
        .route("/post-audio", post(post_audio))
        .route("/chat", post(chat))
        .layer(DefaultBodyLimit::max(app_state.config.upload_max_body_bytes))
}
