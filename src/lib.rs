pub mod config;
pub mod extract;
pub mod judge;
pub mod ollama;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod query;
pub mod search;

use config::Config;
use pipeline::{DefaultPipeline, PipelineError};

/// Looks up `prompt` on the web with the environment's configuration and
/// returns the text of the first page the model judges relevant.
pub async fn ai_search(prompt: &str) -> Result<Option<String>, PipelineError> {
    dotenvy::dotenv().ok();
    let pipeline = DefaultPipeline::from_config(&Config::from_env());
    let outcome = pipeline.search(prompt).await?;
    Ok(outcome.map(|outcome| outcome.content))
}
