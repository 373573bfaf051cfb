use crate::pipeline::ContentExtractor;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Node, Selector};
use thiserror::Error;

/// Why a page produced no text. Callers of [`PageExtractor::extract`] only
/// ever see `None`; the variants exist for logging.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Page returned status {0}")]
    Status(StatusCode),
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("No readable text on page")]
    NoContent,
}

/// Candidate containers for the main content, most specific first.
const MAIN_CONTAINERS: &[&str] = &["article", "main", "[role=\"main\"]", "body"];

const SKIPPED_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "nav", "header", "footer", "aside",
    "form", "button", "select", "iframe", "svg", "canvas", "img", "picture", "video", "audio",
];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li",
    "ul", "ol", "dl", "dt", "dd", "pre", "blockquote", "table", "tr", "td", "th", "figcaption",
    "hr",
];

enum BodyKind {
    Html,
    Plain,
}

pub struct PageExtractor {
    client: Client,
}

impl PageExtractor {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Downloads `url` and returns its readable text, classifying failures.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ExtractError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Status(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());
        let kind = match content_type.as_deref() {
            None => BodyKind::Html,
            Some(ct) if ct.contains("html") => BodyKind::Html,
            Some(ct) if ct.starts_with("text/plain") => BodyKind::Plain,
            Some(ct) => return Err(ExtractError::UnsupportedContentType(ct.to_string())),
        };

        let body = response.text().await?;
        let text = match kind {
            BodyKind::Html => extract_main_text(&body),
            BodyKind::Plain => normalize_lines(&body),
        };

        if text.is_empty() {
            Err(ExtractError::NoContent)
        } else {
            Ok(text)
        }
    }

    /// Like [`fetch_text`](Self::fetch_text) but every failure becomes `None`.
    pub async fn extract(&self, url: &str) -> Option<String> {
        match self.fetch_text(url).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!(url, error = %e, "content extraction failed");
                None
            }
        }
    }
}

impl Default for PageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for PageExtractor {
    async fn extract_content(&self, url: &str) -> Option<String> {
        self.extract(url).await
    }
}

/// Extracts the readable text of an HTML document.
///
/// The first non-empty container from [`MAIN_CONTAINERS`] wins. Boilerplate
/// elements and hidden subtrees are dropped, anchor text is kept without its
/// target, and block elements start new lines. Returns an empty string when
/// nothing readable remains.
pub fn extract_main_text(html: &str) -> String {
    let document = Html::parse_document(html);

    for css in MAIN_CONTAINERS {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        if let Some(root) = document.select(&selector).next() {
            let mut raw = String::new();
            collect_text(root, &mut raw);
            let text = normalize_lines(&raw);
            if !text.is_empty() {
                return text;
            }
        }
    }

    String::new()
}

enum Step<'a> {
    Children(ElementRef<'a>),
    Text(&'a str),
    Newline,
}

// Walks with an explicit stack; page nesting depth is unbounded.
fn collect_text(root: ElementRef, out: &mut String) {
    let mut stack = vec![Step::Children(root)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Text(text) => {
                out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }))
            }
            Step::Newline => out.push('\n'),
            Step::Children(element) => {
                let mut steps = Vec::new();
                for child in element.children() {
                    match child.value() {
                        Node::Text(text) => steps.push(Step::Text(&**text)),
                        Node::Element(el) => {
                            let name = el.name();
                            if SKIPPED_TAGS.contains(&name)
                                || el.attr("hidden").is_some()
                                || el.attr("aria-hidden") == Some("true")
                            {
                                continue;
                            }
                            let Some(child_ref) = ElementRef::wrap(child) else {
                                continue;
                            };
                            let block = BLOCK_TAGS.contains(&name);
                            if block {
                                steps.push(Step::Newline);
                            }
                            steps.push(Step::Children(child_ref));
                            if block {
                                steps.push(Step::Newline);
                            }
                        }
                        _ => {}
                    }
                }
                stack.extend(steps.into_iter().rev());
            }
        }
    }
}

/// Collapses runs of whitespace inside each line and drops blank lines.
pub fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
