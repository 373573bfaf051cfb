use agent_search::config::Config;
use agent_search::judge::SearchGate;
use agent_search::ollama::{ChatMessage, OllamaClient};
use agent_search::output;
use agent_search::pipeline::DefaultPipeline;
use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

/// Find a web page that answers a prompt.
#[derive(Parser, Debug)]
#[command(name = "agent-search", version)]
struct Cli {
    /// What to look up
    #[arg(required = true, num_args = 1..)]
    prompt: Vec<String>,

    /// Ollama model (overrides OLLAMA_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Ollama host (overrides OLLAMA_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Print the outcome as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    /// Ask the model whether a web search is needed before searching
    #[arg(long)]
    check_first: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let prompt = cli.prompt.join(" ");
    let config = Config::from_env()
        .with_model(cli.model)
        .with_host(cli.host);

    if !cli.json {
        output::banner();
        output::config_item("Model", &config.ollama_model);
        output::config_item("Ollama", &config.ollama_host);
        output::config_item("Search", &config.search_endpoint);
        output::status(&format!("Prompt: {}", prompt));
    }

    let ollama = OllamaClient::new(config.ollama_host.clone(), config.ollama_model.clone());
    if !cli.json && !ollama.is_available().await {
        output::warn(&format!("Ollama not reachable at {}", config.ollama_host));
    }

    if cli.check_first {
        let gate = SearchGate::new(ollama.clone());
        match gate.needs_search(&[ChatMessage::user(prompt.as_str())]).await {
            Ok(true) => {}
            Ok(false) => {
                if cli.json {
                    println!("null");
                } else {
                    output::info("The model answered that no web search is needed");
                }
                return;
            }
            Err(e) => {
                output::failure(cli.json, &format!("Search check failed: {}", e));
                process::exit(1);
            }
        }
    }

    let pipeline = DefaultPipeline::with_client(ollama, &config);
    let spinner = output::spinner("Searching the web...");
    let result = pipeline.search(&prompt).await;
    spinner.finish_and_clear();

    match result {
        Ok(Some(outcome)) if cli.json => match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                output::failure(true, &format!("Failed to encode result: {}", e));
                process::exit(1);
            }
        },
        Ok(Some(outcome)) => output::outcome(&outcome),
        Ok(None) if cli.json => println!("null"),
        Ok(None) => output::warn("No relevant page found"),
        Err(e) => {
            output::failure(cli.json, &e.to_string());
            process::exit(1);
        }
    }
}
