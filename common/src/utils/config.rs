use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackendKind {
    OpenAI,
    Hashed,
}

fn default_embedding_backend() -> EmbeddingBackendKind {
    EmbeddingBackendKind::OpenAI
}

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub openai_api_key: String,
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_completion_model")]
    pub completion_model: String,
    #[serde(default = "default_vision_model")]
    pub vision_model: String,
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    #[serde(default = "default_embedding_backend")]
    pub embedding_backend: EmbeddingBackendKind,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: u32,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    pub http_port: u16,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_retrieval_top_k")]
    pub retrieval_top_k: usize,
    #[serde(default = "default_external_timeout_secs")]
    pub external_timeout_secs: u64,
    #[serde(default = "default_upload_max_body_bytes")]
    pub upload_max_body_bytes: usize,
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_completion_model() -> String {
    "gemma3:4b".to_string()
}

fn default_vision_model() -> String {
    "gemma3:4b".to_string()
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embedding_dimensions() -> u32 {
    768
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_retrieval_top_k() -> usize {
    3
}

fn default_external_timeout_secs() -> u64 {
    60
}

fn default_upload_max_body_bytes() -> usize {
    25_000_000
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
