//! Message construction for chat turns and summaries.

use docchat_config::{ChatConfig, SummaryConfig};
use docchat_core::message::{ConversationHistory, Message};
use tracing::debug;

use crate::context::truncate_content;

/// Messages for one chat turn.
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    /// System instruction, recent history oldest first, then the question.
    pub messages: Vec<Message>,
    /// Whether the request was rebuilt with the fallback context cap.
    pub fallback_applied: bool,
}

impl BuiltPrompt {
    /// Sum of every message's length in characters.
    pub fn total_chars(&self) -> usize {
        self.messages.iter().map(Message::char_len).sum()
    }
}

/// Builds chat-turn messages within the configured character limits.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    config: ChatConfig,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(ChatConfig::default())
    }
}

impl PromptBuilder {
    pub fn new(config: ChatConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// System instruction with the document context cut to `max_chars`.
    pub fn system_instruction(&self, context: &str, max_chars: usize) -> String {
        let content = truncate_content(context, max_chars, self.config.boundary_lookback);
        format!(
            "You are an AI assistant that helps users understand and analyze their documents.\n\
             You have access to the following document content:\n\n\
             {content}\n\n\
             Please answer questions based on this content. If the question cannot be answered \
             from the provided documents, please say so clearly. Be helpful, accurate, and cite \
             specific parts of the documents when relevant.\n\
             Keep your responses concise but informative."
        )
    }

    /// Build the messages for `question` against `context`.
    ///
    /// `history` is every turn before this question; only the most recent
    /// `history_turns` are sent. When the whole request is longer than
    /// `request_char_limit`, the system instruction is rebuilt with
    /// `fallback_context_char_limit`.
    pub fn build(&self, question: &str, context: &str, history: &ConversationHistory) -> BuiltPrompt {
        let mut messages = Vec::with_capacity(self.config.history_turns + 2);
        messages.push(Message::system(
            self.system_instruction(context, self.config.context_char_limit),
        ));
        messages.extend(history.recent(self.config.history_turns).iter().cloned());
        messages.push(Message::user(question));

        let mut prompt = BuiltPrompt {
            messages,
            fallback_applied: false,
        };

        let total = prompt.total_chars();
        if total > self.config.request_char_limit {
            debug!(
                total_chars = total,
                limit = self.config.request_char_limit,
                "Request over limit, rebuilding with fallback context cap"
            );
            prompt.messages[0] = Message::system(
                self.system_instruction(context, self.config.fallback_context_char_limit),
            );
            prompt.fallback_applied = true;
        }

        prompt
    }
}

/// Single user message asking for a summary of `context`.
pub fn summary_prompt(context: &str, config: &SummaryConfig, lookback: usize) -> Message {
    let content = truncate_content(context, config.context_char_limit, lookback);
    Message::user(format!(
        "Please provide a concise summary of the following document content, \
         highlighting the main topics, key points, and structure:\n\n\
         {content}\n\n\
         Keep the summary under {} words.",
        config.word_limit
    ))
}
