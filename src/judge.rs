use crate::ollama::{ChatMessage, OllamaClient, OllamaError};
use crate::pipeline::RelevanceJudge;
use crate::prompts::{
    conversation_request, relevance_request, CONTAINS_DATA_PROMPT, SEARCH_OR_NOT_PROMPT,
};
use async_trait::async_trait;

/// Reads a True/False model reply.
///
/// Any reply containing "true" in any case counts as yes, so "I believe this
/// is true." passes and so does an incidental "true" in a longer sentence.
/// Callers rely on this loose match; keep it.
pub fn is_affirmative(reply: &str) -> bool {
    reply.to_lowercase().contains("true")
}

/// Asks the model whether a page answers the prompt it was found for.
pub struct LlmRelevanceJudge {
    ollama: OllamaClient,
}

impl LlmRelevanceJudge {
    pub fn new(ollama: OllamaClient) -> Self {
        Self { ollama }
    }

    pub async fn judge(&self, content: &str, query: &str, prompt: &str) -> Result<bool, OllamaError> {
        let messages = [
            ChatMessage::system(CONTAINS_DATA_PROMPT),
            ChatMessage::user(relevance_request(content, prompt, query)),
        ];
        let reply = self.ollama.chat(&messages).await?;
        let verdict = is_affirmative(&reply);
        tracing::debug!(query, verdict, reply = reply.trim(), "relevance verdict");
        Ok(verdict)
    }
}

#[async_trait]
impl RelevanceJudge for LlmRelevanceJudge {
    async fn is_relevant(&self, content: &str, query: &str, prompt: &str) -> Result<bool, OllamaError> {
        self.judge(content, query, prompt).await
    }
}

/// Decides whether the last message of a conversation needs a web search at all.
pub struct SearchGate {
    ollama: OllamaClient,
}

impl SearchGate {
    pub fn new(ollama: OllamaClient) -> Self {
        Self { ollama }
    }

    pub async fn needs_search(&self, conversation: &[ChatMessage]) -> Result<bool, OllamaError> {
        let messages = [
            ChatMessage::system(SEARCH_OR_NOT_PROMPT),
            ChatMessage::user(conversation_request(conversation)),
        ];
        let reply = self.ollama.chat(&messages).await?;
        Ok(is_affirmative(&reply))
    }
}
