use std::sync::Arc;

use common::{
    error::AppError,
    storage::store::VectorIndexStore,
    utils::{chunking::chunk_text, embedding::EmbeddingProvider},
};
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct IngestionConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestResult {
    pub chunks_added: usize,
}

/// Orchestrates chunking, embedding and index update for extracted text.
///
/// Each call is a self-contained lock → load-or-create → append → save
/// cycle; the pipeline holds no index state between calls. A failure at any
/// step aborts the whole ingestion, leaving the index at its last saved
/// state. Retries are a caller concern.
pub struct IngestionPipeline {
    store: VectorIndexStore,
    embedding_provider: Arc<EmbeddingProvider>,
    config: IngestionConfig,
}

impl IngestionPipeline {
    pub fn new(
        store: VectorIndexStore,
        embedding_provider: Arc<EmbeddingProvider>,
        config: IngestionConfig,
    ) -> Self {
        Self {
            store,
            embedding_provider,
            config,
        }
    }

    #[tracing::instrument(skip_all, fields(source_hint, text_bytes = raw_text.len()))]
    pub async fn ingest(
        &self,
        raw_text: &str,
        source_hint: Option<&str>,
    ) -> Result<IngestResult, AppError> {
        // Vacuous extractions are legal and must not touch the index.
        if raw_text.trim().is_empty() {
            return Ok(IngestResult { chunks_added: 0 });
        }

        let chunks = chunk_text(
            raw_text,
            self.config.chunk_size,
            self.config.chunk_overlap,
            source_hint,
        )?;

        if chunks.is_empty() {
            return Ok(IngestResult { chunks_added: 0 });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedding_provider.embed_batch(texts).await?;

        let chunks_added = chunks.len();

        // The guard serializes the load-modify-save cycle against other
        // ingestions targeting the same index.
        let _guard = self.store.lock().await;

        let index = if self.store.exists() {
            let current = self.store.load().await?;
            self.store.add(current, chunks, embeddings)?
        } else {
            self.store.create_from(chunks, embeddings)?
        };

        self.store.save(&index).await?;

        info!(
            chunks_added,
            index_entries = index.len(),
            "Ingested text into vector index"
        );

        Ok(IngestResult { chunks_added })
    }
}
