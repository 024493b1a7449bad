use std::{sync::Arc, time::Duration};

use async_openai::{
    error::OpenAIError,
    types::{
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::debug;

use crate::error::AppError;

/// Single-prompt completion seam. The answerer and the summarize/translate
/// helpers go through this trait so tests can substitute a counting stub.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AppError>;
}

pub struct OpenAiCompletionModel {
    client: Arc<Client<async_openai::config::OpenAIConfig>>,
    model: String,
    request_timeout: Duration,
}

impl OpenAiCompletionModel {
    pub fn new(
        client: Arc<Client<async_openai::config::OpenAIConfig>>,
        model: String,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client,
            model,
            request_timeout,
        }
    }
}

#[async_trait]
impl CompletionModel for OpenAiCompletionModel {
    async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .build()?;

        let response = timeout(self.request_timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                AppError::ModelUnavailable(format!(
                    "completion request timed out after {}s",
                    self.request_timeout.as_secs()
                ))
            })?
            .map_err(|e| match e {
                OpenAIError::Reqwest(inner) => AppError::ModelUnavailable(inner.to_string()),
                other => AppError::Model(other.to_string()),
            })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::Model("No content found in LLM response".into()))?;

        debug!(response_chars = content.len(), "Received completion");

        Ok(content)
    }
}

/// Translates extracted text to English, leaving the wording of already
/// English input intact.
pub async fn translate_context(
    model: &dyn CompletionModel,
    context: &str,
) -> Result<String, AppError> {
    let prompt = format!(
        r"You are an assistant for translation tasks.
Translate the text below into English. If it is already in English, return it unchanged.
Do not invent content that is not present in the text.

Text:
==================
{context}
"
    );
    model.complete(&prompt).await
}

/// Summarizes extracted text in English, grounded only in the given context.
pub async fn summarize_context(
    model: &dyn CompletionModel,
    context: &str,
) -> Result<String, AppError> {
    let prompt = format!(
        r"You are an assistant for summarization tasks.
Summarize the text below in English, informatively and based only on its content.
Do not invent content that is not present in the text.

Text:
==================
{context}
"
    );
    model.complete(&prompt).await
}
