use crate::config::{MAX_RESULTS, SEARCH_USER_AGENT};
use crate::pipeline::ResultFetcher;
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use serde::Serialize;
use thiserror::Error;
use url::Url;

pub const NO_DESCRIPTION: &str = "No description available";

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Search engine returned status {0}")]
    Status(StatusCode),
}

/// One entry of the search engine's result page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// 1-based position of the result container on the page.
    pub rank: usize,
    pub link: String,
    pub snippet: String,
}

/// Scrapes the DuckDuckGo HTML endpoint (or anything serving the same markup).
pub struct WebSearch {
    client: Client,
    endpoint: String,
}

impl WebSearch {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let url = format!("{}?q={}", self.endpoint, urlencoding::encode(query));
        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, SEARCH_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, query, "search request rejected");
            return Err(SearchError::Status(status));
        }

        let body = response.text().await?;
        let results = parse_results(&body, &self.endpoint, MAX_RESULTS);
        tracing::debug!(query, count = results.len(), "parsed search results");
        Ok(results)
    }
}

#[async_trait]
impl ResultFetcher for WebSearch {
    async fn fetch_results(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        self.search(query).await
    }
}

/// Parses result containers in page order.
///
/// Containers are enumerated from 1 and parsing stops once the index passes
/// `cap`, so a container without a link anchor still uses up its position.
/// The rank of a result is its container index.
pub fn parse_results(html: &str, base: &str, cap: usize) -> Vec<SearchResult> {
    let container_sel = Selector::parse("div.result").expect("valid selector");
    let title_sel = Selector::parse("a.result__a").expect("valid selector");
    let snippet_sel = Selector::parse("a.result__snippet").expect("valid selector");

    let base = Url::parse(base).ok();
    let document = Html::parse_document(html);
    let mut results = Vec::new();

    for (index, element) in document.select(&container_sel).enumerate() {
        let rank = index + 1;
        if rank > cap {
            break;
        }

        let href = element
            .select(&title_sel)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty());
        let Some(href) = href else {
            continue;
        };

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|s| collapse_whitespace(&s.text().collect::<String>()))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        results.push(SearchResult {
            rank,
            link: resolve_link(href, base.as_ref()),
            snippet,
        });
    }

    results
}

/// Turns a result href into a fetchable URL, unwrapping DuckDuckGo's
/// `/l/?uddg=<target>` redirect links.
pub fn resolve_link(href: &str, base: Option<&Url>) -> String {
    let parsed = if href.starts_with("//") {
        Url::parse(&format!("https:{}", href))
    } else {
        match base {
            Some(base) => base.join(href),
            None => Url::parse(href),
        }
    };

    let Ok(url) = parsed else {
        return href.to_string();
    };

    if url.path().starts_with("/l/") {
        if let Some((_, target)) = url.query_pairs().find(|(key, _)| key == "uddg") {
            if !target.is_empty() {
                return target.into_owned();
            }
        }
    }

    url.to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    const BASE: &str = "https://html.duckduckgo.com/html";

    fn result_div(link: Option<&str>, snippet: Option<&str>) -> String {
        let anchor = link
            .map(|l| format!(r#"<h2><a class="result__a" href="{}">Title</a></h2>"#, l))
            .unwrap_or_default();
        let snippet = snippet
            .map(|s| format!(r#"<a class="result__snippet">{}</a>"#, s))
            .unwrap_or_default();
        format!(
            r#"<div class="result results_links web-result"><div class="links_main result__body">{}{}</div></div>"#,
            anchor, snippet
        )
    }

    fn page(divs: &[String]) -> String {
        format!(
            "<html><body><div id=\"links\">{}</div></body></html>",
            divs.concat()
        )
    }

    #[test]
    fn parses_link_and_snippet_in_page_order() {
        let html = page(&[
            result_div(Some("https://a.example/"), Some("First <b>hit</b>\n  here")),
            result_div(Some("https://b.example/page"), Some("Second")),
        ]);

        let results = parse_results(&html, BASE, MAX_RESULTS);

        assert_eq!(
            results,
            vec![
                SearchResult {
                    rank: 1,
                    link: "https://a.example/".to_string(),
                    snippet: "First hit here".to_string(),
                },
                SearchResult {
                    rank: 2,
                    link: "https://b.example/page".to_string(),
                    snippet: "Second".to_string(),
                },
            ]
        );
    }

    #[test]
    fn missing_snippet_falls_back_to_placeholder() {
        let html = page(&[
            result_div(Some("https://a.example/"), None),
            result_div(Some("https://b.example/"), Some("   ")),
        ]);

        let results = parse_results(&html, BASE, MAX_RESULTS);

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.snippet == NO_DESCRIPTION));
    }

    #[test]
    fn cap_bounds_container_position_not_valid_results() {
        let mut divs: Vec<String> = (1..=12)
            .map(|i| result_div(Some(&format!("https://site{}.example/", i)), Some("s")))
            .collect();
        divs[2] = result_div(None, Some("ad without link"));
        divs[5] = result_div(Some(""), Some("empty href"));

        let results = parse_results(&page(&divs), BASE, MAX_RESULTS);

        let ranks: Vec<usize> = results.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 4, 5, 7, 8, 9, 10]);
        assert!(results.iter().all(|r| !r.link.is_empty()));
        assert!(results.iter().all(|r| (1..=10).contains(&r.rank)));
    }

    #[test]
    fn no_containers_yields_empty_list() {
        assert!(parse_results("<html><body>No results.</body></html>", BASE, 10).is_empty());
    }

    #[test]
    fn unwraps_duckduckgo_redirects() {
        let base = Url::parse(BASE).ok();
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FRust&rut=abc";
        assert_eq!(
            resolve_link(href, base.as_ref()),
            "https://en.wikipedia.org/wiki/Rust"
        );
        assert_eq!(
            resolve_link("/l/?uddg=https%3A%2F%2Fexample.com%2F", base.as_ref()),
            "https://example.com/"
        );
        assert_eq!(
            resolve_link("https://example.com/a?b=c", base.as_ref()),
            "https://example.com/a?b=c"
        );
    }

    #[tokio::test]
    async fn search_sends_encoded_query_with_browser_agent() {
        let server = MockServer::start().await;
        let html = page(&[result_div(Some("https://a.example/"), Some("desc"))]);

        Mock::given(method("GET"))
            .and(path("/html"))
            .and(query_param("q", "rust 2024 edition"))
            .and(|req: &Request| {
                req.headers
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                    == Some(SEARCH_USER_AGENT)
            })
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .expect(1)
            .mount(&server)
            .await;

        let search = WebSearch::new(format!("{}/html", server.uri()));
        let results = search.search("rust 2024 edition").await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].link, "https://a.example/");
        assert_eq!(results[0].snippet, "desc");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/html"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let search = WebSearch::new(format!("{}/html", server.uri()));
        let err = search.search("anything").await.unwrap_err();

        assert!(matches!(err, SearchError::Status(s) if s == StatusCode::FORBIDDEN));
    }
}
