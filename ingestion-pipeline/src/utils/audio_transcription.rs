use std::time::Duration;

use async_openai::types::{AudioResponseFormat, CreateTranscriptionRequestArgs};
use common::error::AppError;
use tokio::time::timeout;

/// Transcribes an audio file through the configured speech-to-text model.
pub async fn transcribe_audio_file(
    file_path: &str,
    openai_client: &async_openai::Client<async_openai::config::OpenAIConfig>,
    model: &str,
    request_timeout: Duration,
) -> Result<String, AppError> {
    let request = CreateTranscriptionRequestArgs::default()
        .file(file_path)
        .model(model)
        .response_format(AudioResponseFormat::Json)
        .build()?;

    let response = timeout(request_timeout, openai_client.audio().transcribe(request))
        .await
        .map_err(|_| {
            AppError::Extraction(format!(
                "audio transcription timed out after {}s",
                request_timeout.as_secs()
            ))
        })?
        .map_err(|e| AppError::Extraction(format!("audio transcription failed: {e}")))?;

    Ok(response.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn timed_out_transcription_is_an_extraction_error() {
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

        let mut audio = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
        audio.write_all(b"not really audio").unwrap();

        let client = async_openai::Client::with_config(
            async_openai::config::OpenAIConfig::new()
                .with_api_key("test-key")
                .with_api_base(format!("http://{addr}/v1")),
        );

        let err = transcribe_audio_file(
            audio.path().to_str().unwrap(),
            &client,
            "stub",
            Duration::from_millis(200),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }
}
