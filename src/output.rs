use crate::pipeline::SearchOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use terminal_size::{terminal_size, Width};
use unicode_width::UnicodeWidthStr;

/// Magnifier prefix for all status output
const LENS: &str = "🔎";

const DEFAULT_WIDTH: usize = 80;
const MAX_WIDTH: usize = 100;

static PLAIN: OnceLock<bool> = OnceLock::new();

/// `NO_COLOR` set to anything non-empty disables styling.
fn plain() -> bool {
    *PLAIN.get_or_init(|| env::var("NO_COLOR").map(|v| !v.is_empty()).unwrap_or(false))
}

fn line(styled: String, raw: &str) {
    println!();
    if plain() {
        println!("{} {}", LENS, raw);
    } else {
        println!("{} {}", LENS, styled);
    }
}

/// Print a status message (cyan)
pub fn status(message: &str) {
    line(message.cyan().to_string(), message);
}

/// Print an info message (white/default)
pub fn info(message: &str) {
    line(message.to_string(), message);
}

/// Print a success message (green)
pub fn success(message: &str) {
    line(message.green().to_string(), message);
}

/// Print a warning message (yellow)
pub fn warn(message: &str) {
    line(message.yellow().to_string(), message);
}

/// Print an error message (red)
pub fn error(message: &str) {
    line(message.red().to_string(), message);
}

/// Stream a diagnostic line is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Stdout,
    Stderr,
}

/// With `--json` stdout carries only the JSON document.
pub fn diagnostic_channel(json: bool) -> Channel {
    if json {
        Channel::Stderr
    } else {
        Channel::Stdout
    }
}

/// Print an error on the channel that suits the output mode
pub fn failure(json: bool, message: &str) {
    match diagnostic_channel(json) {
        Channel::Stderr => eprintln!("error: {}", message),
        Channel::Stdout => error(message),
    }
}

/// Print a startup banner
pub fn banner() {
    let rule = "═".repeat(50);
    println!();
    if plain() {
        println!("{}", rule);
        println!("{}  AGENT SEARCH", LENS);
        println!("{}", rule);
    } else {
        println!("{}", rule.bright_cyan());
        println!("{}  {}", LENS, "AGENT SEARCH".bright_cyan().bold());
        println!("{}", rule.bright_cyan());
    }
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    if plain() {
        println!("---  {}", title);
    } else {
        println!(
            "{}  {}",
            "─".repeat(3).bright_white().dimmed(),
            title.bright_white().bold()
        );
    }
}

/// Print configuration info
pub fn config_item(key: &str, value: &str) {
    if plain() {
        println!("{} {}: {}", LENS, key, value);
    } else {
        println!(
            "{} {} {}",
            LENS,
            format!("{}:", key).bright_white(),
            value.bright_cyan()
        );
    }
}

/// Print the page that answered the prompt
pub fn outcome(outcome: &SearchOutcome) {
    success("Found a relevant page");
    config_item("Query", &outcome.query);
    config_item("URL", &outcome.url);
    config_item("Snippet", &outcome.description);

    section("Content");
    for row in wrap_text(&outcome.content, content_width()) {
        if plain() {
            println!("  {}", row);
        } else {
            println!("  {}", row.bright_white());
        }
    }
    println!();
}

/// Spinner shown on stderr while the lookup runs
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    bar.set_style(style);
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn content_width() -> usize {
    terminal_size()
        .map(|(Width(w), _)| usize::from(w).saturating_sub(4))
        .filter(|w| *w >= 20)
        .unwrap_or(DEFAULT_WIDTH)
        .min(MAX_WIDTH)
}

/// Greedy word wrap by display width. Paragraph breaks are kept and words
/// wider than `width` get a row of their own.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.width();
            if current_width > 0 && current_width + 1 + word_width > width {
                rows.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if current_width > 0 {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
        }

        rows.push(current);
    }

    rows
}
