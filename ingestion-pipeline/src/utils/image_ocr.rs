use std::{path::Path, time::Duration};

use async_openai::types::{
    ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, ImageDetail, ImageUrlArgs,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::error::AppError;
use tokio::time::timeout;
use tracing::debug;

const IMAGE_OCR_PROMPT: &str = "Extract all visible text from this image, preserving the \
reading order. Return only the extracted text with no commentary. If the image contains no \
text, return an empty response.";

/// Runs OCR over an image by handing it to a vision-capable chat model as a
/// base64 data URL. An empty string means "no text found" and is not an
/// error.
pub async fn extract_image_text(
    file_path: &Path,
    openai_client: &async_openai::Client<async_openai::config::OpenAIConfig>,
    model: &str,
    request_timeout: Duration,
) -> Result<String, AppError> {
    let image_bytes = tokio::fs::read(file_path).await.map_err(|e| {
        AppError::Extraction(format!("failed to read image {}: {e}", file_path.display()))
    })?;

    let mime = mime_guess::from_path(file_path).first_or_octet_stream();
    let image_url = format!("data:{};base64,{}", mime.essence_str(), STANDARD.encode(&image_bytes));

    let content_parts = vec![
        ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(IMAGE_OCR_PROMPT)
            .build()?
            .into(),
        ChatCompletionRequestMessageContentPartImageArgs::default()
            .image_url(
                ImageUrlArgs::default()
                    .url(image_url)
                    .detail(ImageDetail::High)
                    .build()?,
            )
            .build()?
            .into(),
    ];

    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages([ChatCompletionRequestUserMessageArgs::default()
            .content(content_parts)
            .build()?
            .into()])
        .build()?;

    let response = timeout(request_timeout, openai_client.chat().create(request))
        .await
        .map_err(|_| {
            AppError::Extraction(format!(
                "image OCR timed out after {}s",
                request_timeout.as_secs()
            ))
        })?
        .map_err(|e| AppError::Extraction(format!("image OCR failed: {e}")))?;

    let text = response
        .choices
        .first()
        .and_then(|choice| choice.message.content.clone())
        .unwrap_or_default();

    debug!(
        extracted_chars = text.len(),
        path = %file_path.display(),
        "Image OCR completed"
    );

    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn timed_out_ocr_is_an_extraction_error() {
        // An endpoint that accepts the connection but never answers; only
        // the wrapper's own timeout can end the request.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            loop {
                if let Ok((stream, _)) = listener.accept().await {
                    held.push(stream);
                }
            }
        });

        let mut image = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        image.write_all(b"not really a png").unwrap();

        let client = async_openai::Client::with_config(
            async_openai::config::OpenAIConfig::new()
                .with_api_key("test-key")
                .with_api_base(format!("http://{addr}/v1")),
        );

        let err = extract_image_text(
            image.path(),
            &client,
            "stub",
            Duration::from_millis(200),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }
}
