use async_openai::error::OpenAIError;
use thiserror::Error;
use tokio::task::JoinError;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("OpenAI error: {0}")]
    OpenAI(#[from] OpenAIError),
    #[error("Extraction error: {0}")]
    Extraction(String),
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),
    #[error("Index corrupt: {0}")]
    IndexCorrupt(String),
    #[error("Index not found: {0}")]
    IndexNotFound(String),
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("Model error: {0}")]
    Model(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Query cannot be empty")]
    EmptyQuery,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    Join(#[from] JoinError),
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
    #[error("Ingestion Processing error: {0}")]
    Processing(String),
}
