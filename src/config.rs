use std::env;

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b-instruct-q4_K_M";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html";

/// Desktop browser user agent sent to the search engine; the HTML endpoint
/// rejects obvious bots.
pub const SEARCH_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari";

/// Maximum number of search result containers considered per lookup.
pub const MAX_RESULTS: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub ollama_host: String,
    pub ollama_model: String,
    pub search_endpoint: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            ollama_host: env::var("OLLAMA_HOST")
                .unwrap_or_else(|_| DEFAULT_OLLAMA_HOST.to_string()),
            ollama_model: env::var("OLLAMA_MODEL")
                .unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string()),
            search_endpoint: env::var("SEARCH_ENDPOINT")
                .map(|s| s.trim().to_string())
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.ollama_model = model;
        }
        self
    }

    pub fn with_host(mut self, host: Option<String>) -> Self {
        if let Some(host) = host {
            self.ollama_host = host;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
        }
    }
}
