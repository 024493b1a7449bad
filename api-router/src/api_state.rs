use std::{path::Path, sync::Arc, time::Duration};

use async_openai::Client;
use common::{
    storage::store::VectorIndexStore,
    utils::{
        config::AppConfig,
        embedding::EmbeddingProvider,
        llm::{CompletionModel, OpenAiCompletionModel},
    },
};
use ingestion_pipeline::{IngestionConfig, IngestionPipeline};
use retrieval_pipeline::{AnswerConfig, RetrievalAnswerer};

#[derive(Clone)]
pub struct ApiState {
    pub config: AppConfig,
    pub openai_client: Arc<Client<async_openai::config::OpenAIConfig>>,
    pub pipeline: Arc<IngestionPipeline>,
    pub answerer: Arc<RetrievalAnswerer>,
    pub completion_model: Arc<dyn CompletionModel>,
}

impl ApiState {
    pub fn new(config: &AppConfig) -> Self {
        let openai_client = Arc::new(async_openai::Client::with_config(
            async_openai::config::OpenAIConfig::new()
                .with_api_key(&config.openai_api_key)
                .with_api_base(&config.openai_base_url),
        ));

        let embedding_provider = Arc::new(EmbeddingProvider::from_config(
            config,
            Arc::clone(&openai_client),
        ));

        let completion_model: Arc<dyn CompletionModel> = Arc::new(OpenAiCompletionModel::new(
            Arc::clone(&openai_client),
            config.completion_model.clone(),
            Duration::from_secs(config.external_timeout_secs),
        ));

        Self::with_components(config, openai_client, embedding_provider, completion_model)
    }

    /// Wires the state from pre-built components. Tests use this to inject a
    /// hashed embedding backend and a stubbed completion model.
    pub fn with_components(
        config: &AppConfig,
        openai_client: Arc<Client<async_openai::config::OpenAIConfig>>,
        embedding_provider: Arc<EmbeddingProvider>,
        completion_model: Arc<dyn CompletionModel>,
    ) -> Self {
        let store = VectorIndexStore::for_provider(
            Path::new(&config.data_dir).join("vector_index.json"),
            &embedding_provider,
        );

        let pipeline = Arc::new(IngestionPipeline::new(
            store.clone(),
            Arc::clone(&embedding_provider),
            IngestionConfig {
                chunk_size: config.chunk_size,
                chunk_overlap: config.chunk_overlap,
            },
        ));

        let answerer = Arc::new(RetrievalAnswerer::new(
            store,
            embedding_provider,
            Arc::clone(&completion_model),
            AnswerConfig {
                top_k: config.retrieval_top_k,
            },
        ));

        Self {
            config: config.clone(),
            openai_client,
            pipeline,
            answerer,
            completion_model,
        }
    }
}
