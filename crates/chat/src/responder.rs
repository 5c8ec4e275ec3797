//! Answers questions and writes summaries through a [`Provider`].

use std::sync::Arc;

use docchat_config::{ChatConfig, SummaryConfig};
use docchat_core::error::{Error, ModelOperation};
use docchat_core::message::ConversationHistory;
use docchat_core::provider::{Provider, ProviderRequest};
use tracing::{debug, info, warn};

use crate::prompt::{summary_prompt, PromptBuilder};

/// Stateless question answerer bound to one provider and model.
pub struct ChatResponder {
    provider: Arc<dyn Provider>,
    model: String,
    prompts: PromptBuilder,
    summary: SummaryConfig,
}

impl ChatResponder {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        chat: ChatConfig,
        summary: SummaryConfig,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            prompts: PromptBuilder::new(chat),
            summary,
        }
    }

    /// Responder with the default chat and summary limits.
    pub fn with_defaults(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self::new(provider, model, ChatConfig::default(), SummaryConfig::default())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// The request `respond` would send for this turn.
    pub fn build_request(
        &self,
        question: &str,
        context: &str,
        history: &ConversationHistory,
    ) -> ProviderRequest {
        let prompt = self.prompts.build(question, context, history);
        let config = self.prompts.config();
        debug!(
            messages = prompt.messages.len(),
            chars = prompt.total_chars(),
            fallback = prompt.fallback_applied,
            "Built chat request"
        );
        ProviderRequest {
            model: self.model.clone(),
            messages: prompt.messages,
            temperature: config.temperature,
            max_tokens: Some(config.max_tokens),
        }
    }

    /// Answer `question` from `context`, given the turns that came before it.
    pub async fn respond(
        &self,
        question: &str,
        context: &str,
        history: &ConversationHistory,
    ) -> Result<String, Error> {
        let request = self.build_request(question, context, history);
        self.complete(request, ModelOperation::Response).await
    }

    /// A short free-form summary of `context`.
    pub async fn summarize(&self, context: &str) -> Result<String, Error> {
        let message = summary_prompt(
            context,
            &self.summary,
            self.prompts.config().boundary_lookback,
        );
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![message],
            temperature: self.summary.temperature,
            max_tokens: Some(self.summary.max_tokens),
        };
        self.complete(request, ModelOperation::Summary).await
    }

    async fn complete(
        &self,
        request: ProviderRequest,
        operation: ModelOperation,
    ) -> Result<String, Error> {
        match self.provider.complete(request).await {
            Ok(response) => {
                info!(
                    provider = %self.provider.name(),
                    model = %response.model,
                    %operation,
                    "Model call completed"
                );
                Ok(response.message.content)
            }
            Err(e) => {
                warn!(provider = %self.provider.name(), %operation, error = %e, "Model call failed");
                Err(e.into_model_error(operation))
            }
        }
    }
}
