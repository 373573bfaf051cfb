//! `ai_search` reads its configuration from the process environment, so the
//! cases here run inside a single test to keep the variables from racing.

use agent_search::ai_search;
use serde_json::json;
use std::env;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROMPT: &str = "find description of Billie Eilish lyrics style";

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "model": "test-model",
        "message": {"role": "assistant", "content": content},
        "done": true
    }))
}

/// Serves the model, the search engine and one result page, with the
/// relevance verdict fixed to `verdict`.
async fn lookup_server(verdict: &str) -> MockServer {
    let server = MockServer::start().await;
    let results = format!(
        r#"<html><body><div class="result"><a class="result__a" href="{}/style">Style</a>
        <a class="result__snippet">Her songwriting</a></div></body></html>"#,
        server.uri()
    );

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_string_contains("CREATE A SEARCH QUERY FOR THIS PROMPT"))
        .respond_with(chat_reply("\"billie eilish lyrics style\""))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/html"))
        .and(query_param("q", "billie eilish lyrics style"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(results, "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/style"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body><article><p>Billie Eilish writes dark pop lyrics.</p></article></body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_string_contains("PAGE_TEXT: Billie Eilish writes dark pop lyrics."))
        .respond_with(chat_reply(verdict))
        .expect(1)
        .mount(&server)
        .await;

    server
}

fn point_env_at(server: &MockServer) {
    env::set_var("OLLAMA_HOST", server.uri());
    env::set_var("OLLAMA_MODEL", "test-model");
    env::set_var("SEARCH_ENDPOINT", format!("{}/html", server.uri()));
}

#[tokio::test]
async fn ai_search_uses_environment_configuration() {
    let server = lookup_server("True").await;
    point_env_at(&server);

    let content = ai_search(PROMPT).await.unwrap();

    assert_eq!(
        content,
        Some("Billie Eilish writes dark pop lyrics.".to_string())
    );

    let server = lookup_server("False").await;
    point_env_at(&server);

    assert_eq!(ai_search(PROMPT).await.unwrap(), None);
}
