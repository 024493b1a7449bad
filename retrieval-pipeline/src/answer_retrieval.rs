use std::sync::Arc;

use common::{
    error::AppError,
    storage::{store::VectorIndexStore, types::chunk::Chunk},
    utils::{embedding::EmbeddingProvider, llm::CompletionModel},
};
use serde::Serialize;
use tracing::{debug, info};

/// Returned without a model call when retrieval surfaces nothing, so an
/// ungrounded query never produces a hallucinated answer.
pub const NO_CONTEXT_ANSWER: &str =
    "No relevant information found in the provided context to answer your query.";

#[derive(Debug, Clone, Copy)]
pub struct AnswerConfig {
    pub top_k: usize,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// Answers a query against the persisted vector index: load the current
/// snapshot, embed the query, retrieve the top-k chunks and hand them to the
/// completion model as the only permitted context.
///
/// Stateless per call; multi-turn coherence is a client concern.
pub struct RetrievalAnswerer {
    store: VectorIndexStore,
    embedding_provider: Arc<EmbeddingProvider>,
    model: Arc<dyn CompletionModel>,
    config: AnswerConfig,
}

impl RetrievalAnswerer {
    pub fn new(
        store: VectorIndexStore,
        embedding_provider: Arc<EmbeddingProvider>,
        model: Arc<dyn CompletionModel>,
        config: AnswerConfig,
    ) -> Self {
        Self {
            store,
            embedding_provider,
            model,
            config,
        }
    }

    pub async fn answer(&self, query: &str) -> Result<AnswerResponse, AppError> {
        self.answer_with_k(query, self.config.top_k).await
    }

    #[tracing::instrument(skip_all, fields(k))]
    pub async fn answer_with_k(&self, query: &str, k: usize) -> Result<AnswerResponse, AppError> {
        if query.trim().is_empty() {
            return Err(AppError::EmptyQuery);
        }

        // Distinguishes "never ingested anything" (an error for the caller)
        // from "index exists but nothing matches" (the fixed literal below).
        let index = self.store.load().await?;

        let query_embedding = self.embedding_provider.embed(query).await?;
        let retrieved = index.similarity_search(&query_embedding, k);

        debug!(retrieved = retrieved.len(), "Similarity search completed");

        if retrieved.is_empty() {
            return Ok(AnswerResponse {
                answer: NO_CONTEXT_ANSWER.to_string(),
            });
        }

        let chunks: Vec<Chunk> = retrieved.into_iter().map(|(chunk, _)| chunk).collect();
        let prompt = build_grounded_prompt(&chunks, query);

        let answer = self.model.complete(&prompt).await?;

        info!(answer_chars = answer.len(), "Produced grounded answer");

        Ok(AnswerResponse { answer })
    }
}

fn build_grounded_prompt(chunks: &[Chunk], query: &str) -> String {
    let context = chunks
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r"You are an assistant for question-answering tasks. Answer using only the retrieved context below. If the context does not contain the answer, say that you don't know; do not make anything up. Answer the question informatively, based on the context.

Context Information:
==================
{context}

User Question:
==================
{query}
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use common::storage::types::vector_index::VectorIndex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;
    use tokio::sync::Mutex;

    const TEST_DIM: usize = 64;

    struct StubModel {
        reply: String,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl StubModel {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionModel for StubModel {
        async fn complete(&self, prompt: &str) -> Result<String, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().await.push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    struct TestSetup {
        answerer: RetrievalAnswerer,
        store: VectorIndexStore,
        model: Arc<StubModel>,
        _dir: tempfile::TempDir,
    }

    fn setup(reply: &str) -> TestSetup {
        let dir = tempdir().unwrap();
        let provider = Arc::new(EmbeddingProvider::new_hashed(TEST_DIM));
        let store = VectorIndexStore::for_provider(dir.path().join("vector_index.json"), &provider);
        let model = StubModel::new(reply);
        let answerer = RetrievalAnswerer::new(
            store.clone(),
            provider,
            Arc::clone(&model) as Arc<dyn CompletionModel>,
            AnswerConfig::default(),
        );
        TestSetup {
            answerer,
            store,
            model,
            _dir: dir,
        }
    }

    async fn seed_index(setup: &TestSetup, texts: &[&str]) {
        let provider = EmbeddingProvider::new_hashed(TEST_DIM);
        let chunks: Vec<Chunk> = texts.iter().map(|t| Chunk::new(*t, None)).collect();
        let embeddings = provider
            .embed_batch(texts.iter().map(|t| (*t).to_string()).collect())
            .await
            .unwrap();
        let index = setup.store.create_from(chunks, embeddings).unwrap();
        setup.store.save(&index).await.unwrap();
    }

    #[tokio::test]
    async fn blank_query_is_rejected_without_model_call() {
        let setup = setup("unused");
        let err = setup.answerer.answer("   ").await.unwrap_err();
        assert!(matches!(err, AppError::EmptyQuery));
        assert_eq!(setup.model.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_index_is_reported_as_not_found() {
        let setup = setup("unused");
        let err = setup.answerer.answer("anything there?").await.unwrap_err();
        assert!(matches!(err, AppError::IndexNotFound(_)));
        assert_eq!(setup.model.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_index_yields_fixed_answer_and_zero_model_calls() {
        let setup = setup("unused");

        // An index that exists but holds no entries: the no-context literal,
        // not an error, and no completion request.
        let now = Utc::now();
        let empty = VectorIndex {
            model: None,
            dimension: TEST_DIM,
            created_at: now,
            updated_at: now,
            entries: Vec::new(),
        };
        setup.store.save(&empty).await.unwrap();

        let response = setup.answerer.answer("What animal jumps?").await.unwrap();
        assert_eq!(response.answer, NO_CONTEXT_ANSWER);
        assert_eq!(setup.model.call_count(), 0);
    }

    #[tokio::test]
    async fn grounded_answer_returns_raw_model_output() {
        let setup = setup("A fox.");
        seed_index(
            &setup,
            &["The quick brown fox jumps over the lazy dog.", "Unrelated text about boats."],
        )
        .await;

        let response = setup.answerer.answer("What animal jumps?").await.unwrap();
        assert_eq!(response.answer, "A fox.");
        assert_eq!(setup.model.call_count(), 1);
    }

    #[tokio::test]
    async fn prompt_embeds_context_and_query_verbatim() {
        let setup = setup("ok");
        seed_index(&setup, &["The capital of France is Paris."]).await;

        setup
            .answerer
            .answer("What is the capital of France?")
            .await
            .unwrap();

        let prompts = setup.model.prompts.lock().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("The capital of France is Paris."));
        assert!(prompts[0].contains("What is the capital of France?"));
    }

    #[tokio::test]
    async fn k_limits_the_number_of_context_chunks() {
        let setup = setup("ok");
        seed_index(
            &setup,
            &[
                "fox fact one about jumping",
                "fox fact two about jumping",
                "fox fact three about jumping",
            ],
        )
        .await;

        setup
            .answerer
            .answer_with_k("fox jumping", 1)
            .await
            .unwrap();

        let prompts = setup.model.prompts.lock().await;
        let context_lines = prompts[0]
            .lines()
            .filter(|line| line.contains("fox fact"))
            .count();
        assert_eq!(context_lines, 1);
    }
}
