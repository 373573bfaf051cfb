//! Prompt-to-page lookup.
//!
//! A [`SearchPipeline`] turns a prompt into a query, fetches search results
//! and walks them in order: extract the page, skip it if nothing could be
//! extracted, otherwise ask the judge and stop at the first relevant page.
//! Every step is awaited before the next one starts.

use crate::config::Config;
use crate::extract::PageExtractor;
use crate::judge::LlmRelevanceJudge;
use crate::ollama::{OllamaClient, OllamaError};
use crate::query::{LlmQueryGenerator, QueryError};
use crate::search::{SearchError, SearchResult, WebSearch};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[async_trait]
pub trait QueryGenerator: Send + Sync {
    async fn generate_query(&self, prompt: &str) -> Result<String, QueryError>;
}

#[async_trait]
pub trait ResultFetcher: Send + Sync {
    async fn fetch_results(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}

/// Page download and text extraction. Never fails: no text is `None`.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract_content(&self, url: &str) -> Option<String>;
}

#[async_trait]
pub trait RelevanceJudge: Send + Sync {
    async fn is_relevant(&self, content: &str, query: &str, prompt: &str)
        -> Result<bool, OllamaError>;
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),
    #[error("Relevance check failed: {0}")]
    Judge(#[from] OllamaError),
}

/// The first page judged relevant, with the query that found it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub url: String,
    pub content: String,
    pub description: String,
}

pub struct SearchPipeline<Q, F, E, J> {
    query_generator: Q,
    fetcher: F,
    extractor: E,
    judge: J,
}

pub type DefaultPipeline =
    SearchPipeline<LlmQueryGenerator, WebSearch, PageExtractor, LlmRelevanceJudge>;

impl DefaultPipeline {
    pub fn from_config(config: &Config) -> Self {
        let ollama = OllamaClient::new(config.ollama_host.clone(), config.ollama_model.clone());
        Self::with_client(ollama, config)
    }

    pub fn with_client(ollama: OllamaClient, config: &Config) -> Self {
        SearchPipeline::new(
            LlmQueryGenerator::new(ollama.clone()),
            WebSearch::new(config.search_endpoint.clone()),
            PageExtractor::new(),
            LlmRelevanceJudge::new(ollama),
        )
    }
}

impl<Q, F, E, J> SearchPipeline<Q, F, E, J>
where
    Q: QueryGenerator,
    F: ResultFetcher,
    E: ContentExtractor,
    J: RelevanceJudge,
{
    pub fn new(query_generator: Q, fetcher: F, extractor: E, judge: J) -> Self {
        Self {
            query_generator,
            fetcher,
            extractor,
            judge,
        }
    }

    /// Runs one lookup. `Ok(None)` means every result was tried and none was
    /// relevant.
    pub async fn search(&self, prompt: &str) -> Result<Option<SearchOutcome>, PipelineError> {
        let query = self.query_generator.generate_query(prompt).await?;
        tracing::info!(%query, "generated search query");

        let results = self.fetcher.fetch_results(&query).await?;
        tracing::info!(count = results.len(), "fetched search results");

        for result in results {
            let content = self
                .extractor
                .extract_content(&result.link)
                .await
                .filter(|text| !text.is_empty());
            let Some(content) = content else {
                tracing::debug!(rank = result.rank, link = %result.link, "no content, skipping");
                continue;
            };

            if self.judge.is_relevant(&content, &query, prompt).await? {
                tracing::info!(rank = result.rank, link = %result.link, "found relevant page");
                return Ok(Some(SearchOutcome {
                    query,
                    url: result.link,
                    content,
                    description: result.snippet,
                }));
            }
            tracing::debug!(rank = result.rank, link = %result.link, "page not relevant");
        }

        tracing::info!(%query, "no relevant page found");
        Ok(None)
    }
}
