//! Utility functions and helpers.

pub mod http;

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Resolve a URL string against a base URL string.
pub fn resolve(base_url: &str, href: &str) -> Option<String> {
    Url::parse(base_url)
        .ok()
        .map(|base| resolve_url(&base, href))
}

static COUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").expect("valid regex"));

/// Coerce counter text like `"1,234"` or `" 56 "` to a number.
///
/// Non-numeric or missing text coerces to 0; that is the contract for views
/// and comments, not an error.
pub fn parse_count(text: &str) -> u64 {
    let cleaned = text.replace(',', "");
    COUNT
        .captures(&cleaned)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

static TRAILING_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[\d+\]$").expect("valid regex"));

/// Strip a trailing `[N]` comment-count suffix from a title.
pub fn strip_comment_suffix(title: &str) -> String {
    TRAILING_COMMENT.replace(title, "").trim().to_string()
}
