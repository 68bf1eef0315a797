//! Text acquisition
//!
//! Downloads a page over HTTP(S) and reduces it to plain text. Network
//! failures and non-success statuses are retried with a linear backoff;
//! a non-textual content type or a page that cleans to nothing fails on the
//! first attempt. Retries live here only: callers get either text or a
//! single [`FetchError`].

use crate::error::{FetchError, FetchResult};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Browser-like User-Agent; some sites refuse obvious bots
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static SCRIPT_STYLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>")
        .expect("Invalid script/style regex")
});

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("Invalid tag regex"));

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// HTTP fetch settings
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout
    pub timeout: Duration,

    /// Total attempts, including the first
    pub attempts: u32,

    /// Base backoff; attempt `n` sleeps `backoff * n` before retrying
    pub backoff: Duration,

    /// User-Agent header
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            attempts: 3,
            backoff: Duration::from_millis(700),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Outcome of a single failed attempt
#[derive(Debug)]
enum AttemptError {
    /// Worth another try
    Retryable(String),
    /// Retrying would give the same answer
    Fatal(FetchError),
}

/// Fetch `url` and return its cleaned plain text
pub async fn fetch_text(url: &str, config: &FetchConfig) -> FetchResult<String> {
    validate_url(url)?;

    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| FetchError::Client(e.to_string()))?;

    let attempts = config.attempts.max(1);
    let mut last_reason = String::new();

    for attempt in 1..=attempts {
        debug!(url, attempt, "Fetching");
        match fetch_once(&client, url).await {
            Ok(text) => {
                info!(url, chars = text.len(), attempt, "Fetched text");
                return Ok(text);
            }
            Err(AttemptError::Fatal(e)) => return Err(e),
            Err(AttemptError::Retryable(reason)) => {
                warn!(url, attempt, attempts, reason = %reason, "Fetch attempt failed");
                last_reason = reason;
                if attempt < attempts {
                    tokio::time::sleep(config.backoff * attempt).await;
                }
            }
        }
    }

    Err(FetchError::Network {
        url: url.to_string(),
        attempts,
        reason: last_reason,
    })
}

async fn fetch_once(client: &reqwest::Client, url: &str) -> Result<String, AttemptError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AttemptError::Retryable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AttemptError::Retryable(format!("HTTP {}", status)));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();
    if !is_textual(&content_type) {
        return Err(AttemptError::Fatal(FetchError::UnsupportedContentType {
            url: url.to_string(),
            content_type: if content_type.is_empty() {
                "-".to_string()
            } else {
                content_type
            },
        }));
    }

    let body = response
        .text()
        .await
        .map_err(|e| AttemptError::Retryable(e.to_string()))?;

    let cleaned = strip_html(&body);
    if cleaned.is_empty() {
        return Err(AttemptError::Fatal(FetchError::EmptyContent {
            url: url.to_string(),
        }));
    }
    Ok(cleaned)
}

fn validate_url(url: &str) -> FetchResult<()> {
    let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn is_textual(content_type: &str) -> bool {
    ["text", "json", "xml"]
        .iter()
        .any(|kind| content_type.contains(kind))
}

/// Read a local text file; `.html`/`.htm` files are cleaned like fetched pages
pub fn read_text_file(path: &Path) -> FetchResult<String> {
    let raw = fs::read_to_string(path).map_err(|source| FetchError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let is_html = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        .unwrap_or(false);

    Ok(if is_html { strip_html(&raw) } else { raw })
}

/// Reduce HTML to plain text
///
/// Drops `<script>`/`<style>` blocks and all tags, decodes entities and
/// collapses whitespace.
pub fn strip_html(html: &str) -> String {
    let without_scripts = SCRIPT_STYLE_REGEX.replace_all(html, " ");
    let without_tags = TAG_REGEX.replace_all(&without_scripts, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    WHITESPACE_REGEX
        .replace_all(&decoded, " ")
        .trim()
        .to_string()
}
