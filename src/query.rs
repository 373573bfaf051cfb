use crate::ollama::{ChatMessage, OllamaClient, OllamaError};
use crate::pipeline::QueryGenerator;
use crate::prompts::{query_request, QUERY_GENERATOR_PROMPT};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Query generation failed: {0}")]
    Model(#[from] OllamaError),
    #[error("Model returned an empty search query")]
    Empty,
}

/// Strips surrounding whitespace and double quotes from a model reply.
pub fn clean_query(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim()
}

pub struct LlmQueryGenerator {
    ollama: OllamaClient,
}

impl LlmQueryGenerator {
    pub fn new(ollama: OllamaClient) -> Self {
        Self { ollama }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, QueryError> {
        let messages = [
            ChatMessage::system(QUERY_GENERATOR_PROMPT),
            ChatMessage::user(query_request(prompt)),
        ];
        let reply = self.ollama.chat(&messages).await?;

        let query = clean_query(&reply);
        if query.is_empty() {
            return Err(QueryError::Empty);
        }
        Ok(query.to_string())
    }
}

#[async_trait]
impl QueryGenerator for LlmQueryGenerator {
    async fn generate_query(&self, prompt: &str) -> Result<String, QueryError> {
        self.generate(prompt).await
    }
}
