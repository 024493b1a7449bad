use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::Arc,
    time::Duration,
};

use async_openai::{types::CreateEmbeddingRequestArgs, Client};
use tokio::time::timeout;
use tracing::debug;

use crate::{
    error::AppError,
    utils::config::{AppConfig, EmbeddingBackendKind},
};

/// Maps text to fixed-dimension vectors. All entries of one index must be
/// produced by the same provider identity; `model_code` and `dimension` are
/// recorded alongside the index so a mismatch is caught on load.
#[derive(Clone)]
pub struct EmbeddingProvider {
    inner: EmbeddingInner,
}

#[derive(Clone)]
enum EmbeddingInner {
    OpenAI {
        client: Arc<Client<async_openai::config::OpenAIConfig>>,
        model: String,
        dimensions: u32,
        request_timeout: Duration,
    },
    Hashed {
        dimension: usize,
    },
}

impl EmbeddingProvider {
    pub fn from_config(
        config: &AppConfig,
        client: Arc<Client<async_openai::config::OpenAIConfig>>,
    ) -> Self {
        match config.embedding_backend {
            EmbeddingBackendKind::OpenAI => Self::new_openai(
                client,
                config.embedding_model.clone(),
                config.embedding_dimensions,
                Duration::from_secs(config.external_timeout_secs),
            ),
            EmbeddingBackendKind::Hashed => {
                Self::new_hashed(config.embedding_dimensions as usize)
            }
        }
    }

    pub fn new_openai(
        client: Arc<Client<async_openai::config::OpenAIConfig>>,
        model: String,
        dimensions: u32,
        request_timeout: Duration,
    ) -> Self {
        EmbeddingProvider {
            inner: EmbeddingInner::OpenAI {
                client,
                model,
                dimensions,
                request_timeout,
            },
        }
    }

    pub fn new_hashed(dimension: usize) -> Self {
        EmbeddingProvider {
            inner: EmbeddingInner::Hashed {
                dimension: dimension.max(1),
            },
        }
    }

    pub fn dimension(&self) -> usize {
        match &self.inner {
            EmbeddingInner::Hashed { dimension } => *dimension,
            EmbeddingInner::OpenAI { dimensions, .. } => *dimensions as usize,
        }
    }

    pub fn model_code(&self) -> Option<String> {
        match &self.inner {
            EmbeddingInner::OpenAI { model, .. } => Some(model.clone()),
            EmbeddingInner::Hashed { .. } => None,
        }
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let mut vectors = self.embed_batch(vec![text.to_owned()]).await?;
        vectors.pop().ok_or_else(|| {
            AppError::EmbeddingUnavailable("no embedding returned for input".into())
        })
    }

    /// Embeds a batch of texts, preserving input order.
    pub async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        match &self.inner {
            EmbeddingInner::Hashed { dimension } => Ok(texts
                .into_iter()
                .map(|text| hashed_embedding(&text, *dimension))
                .collect()),
            EmbeddingInner::OpenAI {
                client,
                model,
                dimensions,
                request_timeout,
            } => {
                let request = CreateEmbeddingRequestArgs::default()
                    .model(model.clone())
                    .input(texts)
                    .dimensions(*dimensions)
                    .build()?;

                let response = timeout(*request_timeout, client.embeddings().create(request))
                    .await
                    .map_err(|_| {
                        AppError::EmbeddingUnavailable(format!(
                            "embedding request timed out after {}s",
                            request_timeout.as_secs()
                        ))
                    })?
                    .map_err(|e| AppError::EmbeddingUnavailable(e.to_string()))?;

                let embeddings: Vec<Vec<f32>> = response
                    .data
                    .into_iter()
                    .map(|item| item.embedding)
                    .collect();

                debug!(count = embeddings.len(), "Generated embedding batch");

                Ok(embeddings)
            }
        }
    }
}

// Token-bucket embedding used by the hashed backend. Deterministic and
// L2-normalized, so cosine scores behave like the hosted backends.
fn hashed_embedding(text: &str, dimension: usize) -> Vec<f32> {
    let dim = dimension.max(1);
    let mut vector = vec![0.0f32; dim];
    if text.is_empty() {
        return vector;
    }

    let mut token_count = 0f32;
    for token in tokens(text) {
        token_count += 1.0;
        let idx = bucket(&token, dim);
        vector[idx] += 1.0;
    }

    if token_count == 0.0 {
        return vector;
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }

    vector
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_ascii_lowercase())
}

fn bucket(token: &str, dimension: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    (hasher.finish() as usize) % dimension
}
